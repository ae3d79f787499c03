//! Run configuration.
//!
//! Built once from a [`ConfigPort`] at startup and passed by reference to
//! whatever needs it. Missing keys fall back to the defaults below.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::backtest::BacktestConfig;
use super::crossover::MaWindows;
use super::error::{BreadfreeError, Result};
use super::sizing::SizingPolicy;
use super::strategy::{BuyAndHoldStrategy, DoubleMaStrategy, StrategyKind, StrategyName};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_SYMBOL: &str = "518850";
pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.0003;
pub const DEFAULT_WARMUP_BARS: usize = 60;
pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_LONG_WINDOW: usize = 20;
pub const DEFAULT_LOT_SIZE: i64 = 100;
pub const DEFAULT_MAX_POSITION_PCT: f64 = 1.0;

/// Locations searched, in order, when no config path is given.
pub const CONFIG_CANDIDATES: [&str; 2] = ["config.ini", "breadfree/config.ini"];

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: StrategyName,
    pub short_window: usize,
    pub long_window: usize,
    pub lot_size: i64,
    pub max_position_pct: f64,
}

impl StrategyConfig {
    pub fn build(&self) -> Result<StrategyKind> {
        let policy = SizingPolicy::new(self.lot_size, self.max_position_pct)?;
        let kind = match self.name {
            StrategyName::DoubleMa => {
                let windows = MaWindows::new(self.short_window, self.long_window)?;
                StrategyKind::DoubleMa(DoubleMaStrategy::new(windows, policy))
            }
            StrategyName::BuyAndHold => StrategyKind::BuyAndHold(BuyAndHoldStrategy::new(policy)),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: tracing::Level,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backtest: BacktestConfig,
    pub strategy: StrategyConfig,
    pub logging: LoggingConfig,
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_port(port: &dyn ConfigPort) -> Result<Self> {
        let backtest = BacktestConfig {
            symbol: port
                .get_string("backtest", "symbol")
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            start_date: required_date(port, "start_date")?,
            end_date: required_date(port, "end_date")?,
            initial_cash: port
                .get_double("backtest", "initial_cash")?
                .unwrap_or(DEFAULT_INITIAL_CASH),
            commission_rate: port
                .get_double("backtest", "commission_rate")?
                .unwrap_or(DEFAULT_COMMISSION_RATE),
            warmup_bars: get_usize(port, "backtest", "warmup_bars")?
                .unwrap_or(DEFAULT_WARMUP_BARS),
        };

        let name = match port.get_string("strategy", "name") {
            Some(name) => name.parse()?,
            None => StrategyName::DoubleMa,
        };
        let strategy = StrategyConfig {
            name,
            short_window: get_usize(port, "strategy", "short_window")?
                .unwrap_or(DEFAULT_SHORT_WINDOW),
            long_window: get_usize(port, "strategy", "long_window")?
                .unwrap_or(DEFAULT_LONG_WINDOW),
            lot_size: port
                .get_int("strategy", "lot_size")?
                .unwrap_or(DEFAULT_LOT_SIZE),
            max_position_pct: port
                .get_double("strategy", "max_position_pct")?
                .unwrap_or(DEFAULT_MAX_POSITION_PCT),
        };

        let level = match port.get_string("logging", "level") {
            Some(level) => level.parse::<tracing::Level>().map_err(|_| {
                BreadfreeError::invalid("logging", "level", format!("unknown level '{level}'"))
            })?,
            None => tracing::Level::INFO,
        };

        let data_dir = port
            .get_string("backtest", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        Ok(AppConfig {
            backtest,
            strategy,
            logging: LoggingConfig { level },
            data_dir,
        })
    }
}

/// Accepts `YYYY-MM-DD` and `YYYYMMDD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
}

fn required_date(port: &dyn ConfigPort, key: &str) -> Result<NaiveDate> {
    let raw = port
        .get_string("backtest", key)
        .ok_or_else(|| BreadfreeError::ConfigMissing {
            section: "backtest".into(),
            key: key.into(),
        })?;
    parse_date(&raw).ok_or_else(|| {
        BreadfreeError::invalid(
            "backtest",
            key,
            format!("invalid date '{raw}' (expected YYYY-MM-DD or YYYYMMDD)"),
        )
    })
}

fn get_usize(port: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<usize>> {
    match port.get_int(section, key)? {
        None => Ok(None),
        Some(v) => usize::try_from(v).map(Some).map_err(|_| {
            BreadfreeError::invalid(section, key, format!("{key} must not be negative"))
        }),
    }
}

/// First existing candidate path under `base`.
pub fn find_config(base: &Path) -> Option<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| base.join(candidate))
        .find(|path| path.is_file())
}
