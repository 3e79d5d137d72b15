//! Run statistics accumulated bar by bar.
//!
//! Nothing here keeps per-bar history: drawdown is tracked against a running
//! equity peak and round trips are folded into counters as they close.

use crate::domain::account::Account;
use crate::domain::event::EventKind;
use crate::domain::trade::TradeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub bars_processed: u64,
    pub trades: u64,
    pub forced_closes: u64,
    pub round_trips: u64,
    pub trips_won: u64,
    pub trips_lost: u64,
    pub trips_breakeven: u64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub realized_pnl: f64,
    pub initial_cash: f64,
    pub final_cash: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub skipped_insufficient_cash: u64,
    pub skipped_no_position: u64,
    pub invariant_violations: u64,
}

impl RunSummary {
    pub fn events(&self) -> u64 {
        self.skipped_insufficient_cash + self.skipped_no_position + self.invariant_violations
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    bars_processed: u64,
    trades: u64,
    forced_closes: u64,
    trips_won: u64,
    trips_lost: u64,
    trips_breakeven: u64,
    total_wins: f64,
    total_losses: f64,
    largest_win: f64,
    largest_loss: f64,
    peak_equity: Option<f64>,
    max_drawdown: f64,
    skipped_insufficient_cash: u64,
    skipped_no_position: u64,
    invariant_violations: u64,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark-to-market equity after a bar has been fully processed.
    pub fn record_bar(&mut self, equity: f64) {
        self.bars_processed += 1;
        match self.peak_equity {
            Some(peak) if equity <= peak => {
                if peak > 0.0 {
                    let dd = (peak - equity) / peak;
                    if dd > self.max_drawdown {
                        self.max_drawdown = dd;
                    }
                }
            }
            _ => self.peak_equity = Some(equity),
        }
    }

    pub fn record_trade(&mut self, record: &TradeRecord) {
        self.trades += 1;
        if record.forced_close {
            self.forced_closes += 1;
        }
    }

    pub fn record_round_trip(&mut self, pnl: f64) {
        if pnl > 0.0 {
            self.trips_won += 1;
            self.total_wins += pnl;
            if pnl > self.largest_win {
                self.largest_win = pnl;
            }
        } else if pnl < 0.0 {
            self.trips_lost += 1;
            self.total_losses += pnl.abs();
            if pnl.abs() > self.largest_loss {
                self.largest_loss = pnl.abs();
            }
        } else {
            self.trips_breakeven += 1;
        }
    }

    pub fn record_event(&mut self, kind: EventKind) {
        match kind {
            EventKind::SkippedInsufficientCash => self.skipped_insufficient_cash += 1,
            EventKind::SkippedNoPosition => self.skipped_no_position += 1,
            EventKind::InvariantViolation => self.invariant_violations += 1,
        }
    }

    pub fn summarize(&self, account: &Account) -> RunSummary {
        let round_trips = self.trips_won + self.trips_lost + self.trips_breakeven;
        let win_rate = if round_trips > 0 {
            self.trips_won as f64 / round_trips as f64
        } else {
            0.0
        };

        let profit_factor = if self.total_losses > 0.0 {
            self.total_wins / self.total_losses
        } else if self.total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let initial_cash = account.initial_cash();
        let final_equity = account.equity();
        let total_return = if initial_cash > 0.0 {
            (final_equity - initial_cash) / initial_cash
        } else {
            0.0
        };

        RunSummary {
            bars_processed: self.bars_processed,
            trades: self.trades,
            forced_closes: self.forced_closes,
            round_trips,
            trips_won: self.trips_won,
            trips_lost: self.trips_lost,
            trips_breakeven: self.trips_breakeven,
            win_rate,
            profit_factor,
            largest_win: self.largest_win,
            largest_loss: self.largest_loss,
            realized_pnl: account.realized_pnl(),
            initial_cash,
            final_cash: account.cash(),
            final_equity,
            total_return,
            max_drawdown: self.max_drawdown,
            skipped_insufficient_cash: self.skipped_insufficient_cash,
            skipped_no_position: self.skipped_no_position,
            invariant_violations: self.invariant_violations,
        }
    }
}
