//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestResult, run_backtest};
use crate::domain::bar::is_valid_price;
use crate::domain::config::{AppConfig, CONFIG_CANDIDATES, find_config};
use crate::domain::config_validation::validate_config;
use crate::domain::error::{BreadfreeError, Result};
use crate::domain::strategy::BarOutcome;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "breadfree", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override [backtest] symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Override [backtest] data_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Override [logging] level
        #[arg(long)]
        log_level: Option<tracing::Level>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            log_level,
        } => run_backtest_command(config.as_deref(), symbol, data_dir, log_level),
        Command::Validate { config } => run_validate(config.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the stderr fmt subscriber. Later calls are no-ops.
pub fn init_logging(level: tracing::Level) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(Targets::new().with_default(level));
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Use `explicit` if given, otherwise the first candidate under `base`.
pub fn resolve_config_path(explicit: Option<&Path>, base: &Path) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => find_config(base).ok_or_else(|| BreadfreeError::ConfigParse {
            file: CONFIG_CANDIDATES.join(", "),
            reason: "no config file found".to_string(),
        }),
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let adapter = FileConfigAdapter::from_file(path)?;
    AppConfig::from_port(&adapter)
}

fn load_config_from_cli(explicit: Option<&Path>) -> Result<(PathBuf, AppConfig)> {
    let base = std::env::current_dir()?;
    let path = resolve_config_path(explicit, &base)?;
    let config = load_config(&path)?;
    Ok((path, config))
}

fn run_validate(explicit: Option<&Path>) -> Result<()> {
    let (path, config) = load_config_from_cli(explicit)?;
    validate_config(&config)?;
    config.strategy.build()?;
    println!("{}: ok", path.display());
    Ok(())
}

fn run_backtest_command(
    explicit: Option<&Path>,
    symbol: Option<String>,
    data_dir: Option<PathBuf>,
    log_level: Option<tracing::Level>,
) -> Result<()> {
    let (path, mut config) = load_config_from_cli(explicit)?;
    if let Some(symbol) = symbol {
        config.backtest.symbol = symbol;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = log_level {
        config.logging.level = level;
    }

    init_logging(config.logging.level);
    tracing::info!(path = %path.display(), "loaded config");

    let data_port = CsvAdapter::new(config.data_dir.clone());
    let result = run_pipeline(&config, &data_port)?;
    print!("{}", format_summary(&config, &result));
    Ok(())
}

/// Validate, build the strategy, load bars and run the backtest.
pub fn run_pipeline(config: &AppConfig, data_port: &dyn DataPort) -> Result<BacktestResult> {
    validate_config(config)?;
    let mut strategy = config.strategy.build()?;

    // earlier bars are needed for warm-up
    let bars = data_port.fetch_bars(
        &config.backtest.symbol,
        NaiveDate::MIN,
        config.backtest.end_date,
    )?;
    run_backtest(&mut strategy, &bars, &config.backtest)
}

pub fn format_summary(config: &AppConfig, result: &BacktestResult) -> String {
    let m = &result.metrics;
    let bt = &config.backtest;
    let mut out = String::new();
    let _ = writeln!(out, "Symbol:          {}", bt.symbol);
    let _ = writeln!(out, "Strategy:        {}", config.strategy.name);
    let _ = writeln!(out, "Period:          {} .. {}", bt.start_date, bt.end_date);
    let _ = writeln!(out, "Bars:            {}", result.records.len());
    let _ = writeln!(
        out,
        "Skipped bars:    {}",
        result.count(|o| *o == BarOutcome::InvalidPrice)
    );
    let _ = writeln!(out, "Orders:          {}", result.count(BarOutcome::is_order));
    let _ = writeln!(out, "Closed trades:   {}", m.trade_count);
    let _ = writeln!(out, "Win rate:        {:.2}%", m.win_rate * 100.0);
    let _ = writeln!(out, "Initial cash:    {:.2}", bt.initial_cash);
    let _ = writeln!(out, "Final equity:    {:.2}", m.final_equity);
    let _ = writeln!(out, "Total return:    {:.2}%", m.total_return * 100.0);
    let _ = writeln!(out, "Max drawdown:    {:.2}%", m.max_drawdown * 100.0);
    let _ = writeln!(out, "Commission paid: {:.2}", m.total_commission);

    let last_close = result
        .records
        .iter()
        .rev()
        .find(|r| is_valid_price(r.close))
        .map(|r| r.close);
    let position = result.portfolio.get_position(&bt.symbol);
    if let (Some(position), Some(close)) = (position, last_close) {
        let _ = writeln!(
            out,
            "Open position:   {} @ {:.4} (unrealized {:.2})",
            position.quantity,
            position.avg_price,
            position.unrealized_pnl(close)
        );
    }
    out
}
