//! Configuration validation.
//!
//! Checks field ranges on an already parsed [`AppConfig`] before a run.

use super::config::{AppConfig, StrategyConfig};
use super::backtest::BacktestConfig;
use super::error::{BreadfreeError, Result};
use super::strategy::StrategyName;

pub fn validate_config(config: &AppConfig) -> Result<()> {
    validate_backtest_config(&config.backtest)?;
    validate_strategy_config(&config.strategy)?;
    Ok(())
}

pub fn validate_backtest_config(config: &BacktestConfig) -> Result<()> {
    validate_symbol(config)?;
    validate_initial_cash(config)?;
    validate_commission(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<()> {
    if config.name == StrategyName::DoubleMa {
        validate_windows(config)?;
    }
    validate_lot_size(config)?;
    validate_max_position_pct(config)?;
    Ok(())
}

fn validate_symbol(config: &BacktestConfig) -> Result<()> {
    if config.symbol.trim().is_empty() {
        return Err(BreadfreeError::invalid("backtest", "symbol", "symbol must not be empty"));
    }
    Ok(())
}

fn validate_initial_cash(config: &BacktestConfig) -> Result<()> {
    if !(config.initial_cash.is_finite() && config.initial_cash > 0.0) {
        return Err(BreadfreeError::invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_commission(config: &BacktestConfig) -> Result<()> {
    if !(config.commission_rate.is_finite() && config.commission_rate >= 0.0) {
        return Err(BreadfreeError::invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be non-negative",
        ));
    }
    Ok(())
}

fn validate_dates(config: &BacktestConfig) -> Result<()> {
    if config.start_date > config.end_date {
        return Err(BreadfreeError::invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

fn validate_windows(config: &StrategyConfig) -> Result<()> {
    if config.short_window == 0 {
        return Err(BreadfreeError::invalid(
            "strategy",
            "short_window",
            "short_window must be positive",
        ));
    }
    if config.long_window == 0 {
        return Err(BreadfreeError::invalid(
            "strategy",
            "long_window",
            "long_window must be positive",
        ));
    }
    if config.short_window >= config.long_window {
        return Err(BreadfreeError::invalid(
            "strategy",
            "short_window",
            "short_window must be less than long_window",
        ));
    }
    Ok(())
}

fn validate_lot_size(config: &StrategyConfig) -> Result<()> {
    if config.lot_size <= 0 {
        return Err(BreadfreeError::invalid("strategy", "lot_size", "lot_size must be positive"));
    }
    Ok(())
}

fn validate_max_position_pct(config: &StrategyConfig) -> Result<()> {
    let pct = config.max_position_pct;
    if !(0.0..=1.0).contains(&pct) {
        return Err(BreadfreeError::invalid(
            "strategy",
            "max_position_pct",
            "max_position_pct must be between 0 and 1",
        ));
    }
    Ok(())
}
