//! Backtest engine and event loop.
//!
//! `EngineConfig` defines the run parameters. `BacktestEngine` owns the
//! strategy, the account and the trade sink, and replays bars through them:
//!
//! 1. `strategy.on_start()`
//! 2. per bar: ask the strategy for an action, size it, apply it to the
//!    account, emit a trade record on success or an engine event otherwise
//! 3. optionally liquidate any open position at the last bar's close
//! 4. `strategy.on_finish()`
//!
//! The engine is single-threaded and holds no global state. Two engines built
//! from identical inputs produce identical trade sequences.

use std::fmt;

use tracing::{debug, info, info_span, warn};

use crate::domain::account::{Account, CloseOutcome, OpenOutcome};
use crate::domain::bar::Bar;
use crate::domain::error::ReplayError;
use crate::domain::event::EngineEvent;
use crate::domain::metrics::{MetricsTracker, RunSummary};
use crate::domain::strategy::{Strategy, StrategyAction};
use crate::domain::trade::{Side, TradeRecord};
use crate::ports::bar_source::BarSource;
use crate::ports::trade_sink::TradeSink;

/// How many units an `OpenLong` buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Largest whole quantity the cash affords at the bar's close.
    AllIn,
    FixedQty(u64),
}

impl fmt::Display for SizingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizingPolicy::AllIn => f.write_str("all_in"),
            SizingPolicy::FixedQty(q) => write!(f, "fixed_qty({q})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub initial_cash: f64,
    /// Name used in trade records and logs. Empty means "use the strategy's
    /// own name".
    pub strategy_name: String,
    pub sizing: SizingPolicy,
    pub force_close_at_end: bool,
    /// Read by hosts when constructing a bar source.
    pub strict_source: bool,
}

impl EngineConfig {
    pub fn new(initial_cash: f64) -> Self {
        EngineConfig {
            initial_cash,
            strategy_name: String::new(),
            sizing: SizingPolicy::AllIn,
            force_close_at_end: true,
            strict_source: false,
        }
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(ReplayError::invalid(
                "engine",
                "initial_cash",
                "initial_cash must be positive",
            ));
        }
        if let SizingPolicy::FixedQty(0) = self.sizing {
            return Err(ReplayError::invalid(
                "engine",
                "quantity",
                "quantity must be a positive integer for fixed_qty sizing",
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::new(100_000.0)
    }
}

/// Everything a finished run hands back.
pub struct BacktestResult<S, K> {
    pub summary: RunSummary,
    pub account: Account,
    pub events: Vec<EngineEvent>,
    pub strategy: S,
    pub sink: K,
}

pub struct BacktestEngine<S, K>
where
    S: Strategy,
    K: TradeSink,
{
    config: EngineConfig,
    run_name: String,
    strategy: S,
    account: Account,
    sink: K,
    events: Vec<EngineEvent>,
    metrics: MetricsTracker,
    last_bar: Option<Bar>,
    started: bool,
}

impl<S, K> BacktestEngine<S, K>
where
    S: Strategy,
    K: TradeSink,
{
    pub fn new(config: EngineConfig, strategy: S, sink: K) -> Result<Self, ReplayError> {
        config.validate()?;
        let account = Account::new(config.initial_cash)?;
        let run_name = if config.strategy_name.trim().is_empty() {
            strategy.name().to_string()
        } else {
            config.strategy_name.clone()
        };
        Ok(BacktestEngine {
            config,
            run_name,
            strategy,
            account,
            sink,
            events: Vec::new(),
            metrics: MetricsTracker::new(),
            last_bar: None,
            started: false,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Replay a whole source. The first bar is pulled before the strategy is
    /// started, so an unavailable source fails without starting anything.
    pub fn run<B: BarSource>(mut self, mut source: B) -> Result<BacktestResult<S, K>, ReplayError> {
        let span = info_span!("backtest", strategy = %self.run_name);
        let _guard = span.enter();

        let mut next = source.next_bar()?;
        self.start();
        while let Some(bar) = next {
            self.step(&bar);
            next = source.next_bar()?;
        }
        drop(source);
        Ok(self.finish())
    }

    /// Calls `on_start` the first time only. `step` and `finish` call it
    /// implicitly.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!(
            strategy = %self.run_name,
            initial_cash = self.config.initial_cash,
            sizing = %self.config.sizing,
            force_close_at_end = self.config.force_close_at_end,
            "backtest started"
        );
        self.strategy.on_start();
    }

    /// Process one bar. A bar older than the previous one is ignored.
    pub fn step(&mut self, bar: &Bar) {
        self.start();

        if let Some(last) = &self.last_bar {
            if bar.time() < last.time() {
                warn!(
                    time = bar.time(),
                    previous = last.time(),
                    "out-of-order bar ignored"
                );
                return;
            }
        }

        self.account.mark(bar.close());
        match self.strategy.on_bar(bar) {
            StrategyAction::None => {}
            StrategyAction::OpenLong => self.open_long(bar),
            StrategyAction::CloseLong => self.close_long(bar, false),
        }
        self.metrics.record_bar(self.account.equity());
        self.last_bar = Some(bar.clone());
    }

    /// Liquidate if configured, stop the strategy and summarize.
    pub fn finish(mut self) -> BacktestResult<S, K> {
        self.start();

        if self.config.force_close_at_end && !self.account.is_flat() {
            if let Some(bar) = self.last_bar.take() {
                self.close_long(&bar, true);
            }
        }
        self.strategy.on_finish();

        let summary = self.metrics.summarize(&self.account);
        info!(
            strategy = %self.run_name,
            bars = summary.bars_processed,
            trades = summary.trades,
            realized_pnl = summary.realized_pnl,
            final_cash = summary.final_cash,
            events = summary.events(),
            "backtest finished"
        );

        BacktestResult {
            summary,
            account: self.account,
            events: self.events,
            strategy: self.strategy,
            sink: self.sink,
        }
    }

    fn size(&self, price: f64) -> u64 {
        match self.config.sizing {
            SizingPolicy::AllIn => self.account.affordable_quantity(price),
            SizingPolicy::FixedQty(quantity) => quantity,
        }
    }

    fn open_long(&mut self, bar: &Bar) {
        if !self.account.is_flat() {
            self.emit(EngineEvent::InvariantViolation {
                time: bar.time(),
                action: StrategyAction::OpenLong,
                position: self.account.position(),
            });
            return;
        }

        let quantity = self.size(bar.close());
        if quantity == 0 {
            self.emit(EngineEvent::SkippedInsufficientCash {
                time: bar.time(),
                price: bar.close(),
                cash: self.account.cash(),
                quantity,
            });
            return;
        }

        match self.account.open_long(bar, quantity) {
            OpenOutcome::Opened {
                quantity, price, ..
            } => self.record(bar, Side::Buy, price, quantity, false),
            OpenOutcome::InsufficientCash { cash, .. } => {
                self.emit(EngineEvent::SkippedInsufficientCash {
                    time: bar.time(),
                    price: bar.close(),
                    cash,
                    quantity,
                })
            }
            OpenOutcome::ZeroQuantity => self.emit(EngineEvent::SkippedInsufficientCash {
                time: bar.time(),
                price: bar.close(),
                cash: self.account.cash(),
                quantity,
            }),
            OpenOutcome::AlreadyLong { quantity: position } => {
                self.emit(EngineEvent::InvariantViolation {
                    time: bar.time(),
                    action: StrategyAction::OpenLong,
                    position,
                })
            }
        }
    }

    fn close_long(&mut self, bar: &Bar, forced: bool) {
        match self.account.close_long(bar) {
            CloseOutcome::Closed {
                quantity,
                price,
                pnl,
                ..
            } => {
                self.metrics.record_round_trip(pnl);
                self.record(bar, Side::Sell, price, quantity, forced);
            }
            CloseOutcome::NoPosition => {
                self.emit(EngineEvent::SkippedNoPosition { time: bar.time() })
            }
        }
    }

    fn record(&mut self, bar: &Bar, side: Side, price: f64, quantity: u64, forced_close: bool) {
        let record = TradeRecord {
            strategy_name: self.run_name.clone(),
            symbol: bar.symbol().to_string(),
            time: bar.time(),
            price,
            quantity,
            side,
            forced_close,
        };
        debug!(
            side = %record.side,
            symbol = %record.symbol,
            time = record.time,
            price = record.price,
            quantity = record.quantity,
            forced_close = record.forced_close,
            cash = self.account.cash(),
            "trade executed"
        );
        self.metrics.record_trade(&record);
        self.sink.accept(record);
    }

    fn emit(&mut self, event: EngineEvent) {
        warn!(kind = %event.kind(), "{}", event);
        self.metrics.record_event(event.kind());
        self.sink.on_event(&event);
        self.events.push(event);
    }
}

impl<S, K> fmt::Debug for BacktestEngine<S, K>
where
    S: Strategy,
    K: TradeSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BacktestEngine")
            .field("run_name", &self.run_name)
            .field("config", &self.config)
            .field("account", &self.account)
            .field("events", &self.events.len())
            .field("started", &self.started)
            .finish()
    }
}
