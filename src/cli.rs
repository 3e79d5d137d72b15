//! CLI definition and dispatch.
//!
//! The binary is one host of the library: it reads an INI config, replays a
//! CSV bar file through the engine and writes the trades as CSV.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarSource;
use crate::adapters::csv_trade_writer::CsvTradeWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestEngine, BacktestResult, EngineConfig, SizingPolicy};
use crate::domain::config_validation::{
    parse_bool, parse_key, require_key, validate_engine_config, validate_strategy_config, ENGINE,
    STRATEGY,
};
use crate::domain::error::ReplayError;
use crate::domain::indicator::IndicatorType;
use crate::domain::metrics::RunSummary;
use crate::domain::strategy::{FixedBarStrategy, MovingAverageStrategy, Strategy};
use crate::ports::config_port::ConfigPort;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "replaytrader", about = "Single-instrument bar replay backtester")]
pub struct Cli {
    /// Default log filter, overridden by REPLAYTRADER_LOG
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    /// text or json
    #[arg(long, global = true, default_value = "text")]
    pub log_format: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a CSV bar file through the configured strategy
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        /// Fail on the first malformed row instead of skipping it
        #[arg(long)]
        strict: bool,
        /// Trade CSV destination (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var("REPLAYTRADER_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let format = log_format.trim().to_lowercase();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr);
    let installed = match format.as_str() {
        "json" => builder.json().try_init(),
        "text" | "" => builder.try_init(),
        other => return Err(format!("unknown log format '{other}', expected text or json")),
    };
    installed.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            data,
            strict,
            output,
        } => run_backtest(&config, &data, strict, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ReplayError> {
    FileConfigAdapter::from_file(path).map_err(|e| ReplayError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, ReplayError> {
    validate_engine_config(config)?;

    let sizing = match config
        .get_string(ENGINE, "sizing")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        Some("fixed_qty") => SizingPolicy::FixedQty(require_key(config, ENGINE, "quantity")?),
        _ => SizingPolicy::AllIn,
    };

    Ok(EngineConfig {
        initial_cash: require_key(config, ENGINE, "initial_cash")?,
        strategy_name: config
            .get_string(ENGINE, "strategy_name")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        sizing,
        force_close_at_end: flag(config, "force_close_at_end", true),
        strict_source: flag(config, "strict_source", false),
    })
}

fn flag(config: &dyn ConfigPort, key: &str, default: bool) -> bool {
    config
        .get_string(ENGINE, key)
        .as_deref()
        .and_then(parse_bool)
        .unwrap_or(default)
}

/// Builds the `[strategy]` section. `name` is used when non-empty, otherwise
/// the strategy kind names the run.
pub fn build_strategy(
    config: &dyn ConfigPort,
    name: &str,
) -> Result<Box<dyn Strategy>, ReplayError> {
    validate_strategy_config(config)?;

    let kind = config
        .get_string(STRATEGY, "kind")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    let name = if name.trim().is_empty() {
        kind.clone()
    } else {
        name.trim().to_string()
    };

    match kind.as_str() {
        "moving_average" => {
            let fast: usize = require_key(config, STRATEGY, "fast_period")?;
            let slow: usize = require_key(config, STRATEGY, "slow_period")?;
            let ema = config
                .get_string(STRATEGY, "indicator")
                .is_some_and(|s| s.trim().eq_ignore_ascii_case("ema"));
            let (fast, slow) = if ema {
                (IndicatorType::Ema(fast), IndicatorType::Ema(slow))
            } else {
                (IndicatorType::Sma(fast), IndicatorType::Sma(slow))
            };
            let epsilon: f64 = parse_key(config, STRATEGY, "epsilon")?.unwrap_or(0.0);

            let strategy =
                MovingAverageStrategy::with_lines(name, fast, slow)?.with_epsilon(epsilon)?;
            Ok(Box::new(strategy))
        }
        "fixed_bar" => {
            let buy: u64 = require_key(config, STRATEGY, "buy_bar")?;
            let sell: u64 = require_key(config, STRATEGY, "sell_bar")?;
            Ok(Box::new(FixedBarStrategy::new(name, buy, sell)?))
        }
        other => Err(ReplayError::invalid(
            STRATEGY,
            "kind",
            format!("unknown strategy kind '{other}'"),
        )),
    }
}

/// A run whose config, strategy and data file have all been checked. Nothing
/// has been written yet.
pub struct PreparedRun {
    engine_config: EngineConfig,
    strategy: Box<dyn Strategy>,
    source: CsvBarSource,
}

/// Builds everything a run needs and opens the data file. `strict` forces
/// strict parsing on top of the `strict_source` key, in which case every row
/// is validated here.
pub fn prepare_run(
    config: &dyn ConfigPort,
    data: &Path,
    strict: bool,
) -> Result<PreparedRun, ReplayError> {
    let engine_config = build_engine_config(config)?;
    let strategy = build_strategy(config, &engine_config.strategy_name)?;
    let mut source = CsvBarSource::new(data, strict || engine_config.strict_source);
    source.prepare()?;
    info!(data = %source.path().display(), strategy = strategy.name(), "run prepared");

    Ok(PreparedRun {
        engine_config,
        strategy,
        source,
    })
}

impl PreparedRun {
    pub fn execute<W: Write>(
        self,
        output: W,
    ) -> Result<BacktestResult<Box<dyn Strategy>, CsvTradeWriter<W>>, ReplayError> {
        let engine =
            BacktestEngine::new(self.engine_config, self.strategy, CsvTradeWriter::new(output))?;
        let mut result = engine.run(self.source)?;
        result.sink.flush()?;
        Ok(result)
    }
}

/// Config to finished run.
pub fn run_backtest_pipeline<W: Write>(
    config: &dyn ConfigPort,
    data: &Path,
    strict: bool,
    output: W,
) -> Result<BacktestResult<Box<dyn Strategy>, CsvTradeWriter<W>>, ReplayError> {
    prepare_run(config, data, strict)?.execute(output)
}

fn run_backtest(config_path: &Path, data: &Path, strict: bool, output: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    eprintln!("Replaying {}", data.display());
    let prepared = match prepare_run(&adapter, data, strict) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let writer: Box<dyn Write> = match output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(io::BufWriter::new(file)),
            Err(e) => {
                eprintln!("error: failed to create {}: {e}", path.display());
                return ExitCode::from(1);
            }
        },
        None => Box::new(io::stdout().lock()),
    };

    match prepared.execute(writer) {
        Ok(result) => {
            print_summary(result.strategy.name(), &result.summary);
            if result.sink.failures() > 0 {
                eprintln!(
                    "warning: {} trade rows could not be written",
                    result.sink.failures()
                );
            }
            if let Some(path) = output {
                eprintln!("\nTrades written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    let engine_config = match build_engine_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy(&adapter, &engine_config.strategy_name) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("\nEngine:");
    eprintln!("  Initial cash:       {:.2}", engine_config.initial_cash);
    eprintln!("  Sizing:             {}", engine_config.sizing);
    eprintln!("  Force close at end: {}", engine_config.force_close_at_end);
    eprintln!("  Strict source:      {}", engine_config.strict_source);
    eprintln!("\nStrategy: {}", strategy.name());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn fail(err: &ReplayError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn print_summary(name: &str, summary: &RunSummary) {
    eprintln!("\n=== Backtest Results: {name} ===");
    eprintln!("Bars processed:   {}", summary.bars_processed);
    eprintln!(
        "Trades:           {} ({} forced)",
        summary.trades, summary.forced_closes
    );
    eprintln!(
        "Round trips:      {} (won {}, lost {}, even {})",
        summary.round_trips, summary.trips_won, summary.trips_lost, summary.trips_breakeven
    );
    eprintln!("Win rate:         {:.2}%", summary.win_rate * 100.0);
    eprintln!("Realized P&L:     {:.2}", summary.realized_pnl);
    eprintln!("Initial cash:     {:.2}", summary.initial_cash);
    eprintln!("Final cash:       {:.2}", summary.final_cash);
    eprintln!("Final equity:     {:.2}", summary.final_equity);
    eprintln!("Total return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Max drawdown:     {:.2}%", summary.max_drawdown * 100.0);
    if summary.events() > 0 {
        eprintln!(
            "Engine events:    {} skipped (cash), {} skipped (no position), {} rejected",
            summary.skipped_insufficient_cash,
            summary.skipped_no_position,
            summary.invariant_violations
        );
    }
}
