//! Backtest engine and event loop.
//!
//! Bars dated before `start_date` seed the strategy's history; bars in
//! `[start_date, end_date]` are fed to the strategy one at a time and the
//! portfolio is marked to market after each.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::bar::Bar;
use super::error::{BreadfreeError, Result};
use super::metrics::Metrics;
use super::portfolio::Portfolio;
use super::strategy::{BarOutcome, StrategyKind};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
    pub commission_rate: f64,
    /// Maximum number of pre-start closes handed to `preload`.
    pub warmup_bars: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRecord {
    pub date: NaiveDate,
    pub close: f64,
    pub outcome: BarOutcome,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub records: Vec<BarRecord>,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn count(&self, pred: impl Fn(&BarOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Closes dated before `start`, skipping invalid prices, at most `limit` of
/// the most recent ones.
pub fn warmup_closes(bars: &[Bar], start: NaiveDate, limit: usize) -> Vec<f64> {
    let closes: Vec<f64> = bars
        .iter()
        .filter(|b| b.date < start && b.has_valid_close())
        .map(|b| b.close)
        .collect();
    let skip = closes.len().saturating_sub(limit);
    closes[skip..].to_vec()
}

pub fn run_backtest(
    strategy: &mut StrategyKind,
    bars: &[Bar],
    config: &BacktestConfig,
) -> Result<BacktestResult> {
    let symbol = config.symbol.as_str();
    strategy.set_symbol(symbol);

    let warmup = warmup_closes(bars, config.start_date, config.warmup_bars);
    if !warmup.is_empty() {
        strategy.preload(warmup);
    }

    let live: Vec<&Bar> = bars
        .iter()
        .filter(|b| b.date >= config.start_date && b.date <= config.end_date)
        .collect();
    if live.is_empty() {
        return Err(BreadfreeError::NoData {
            symbol: symbol.to_string(),
            start: config.start_date.to_string(),
            end: config.end_date.to_string(),
        });
    }

    tracing::info!(
        symbol,
        strategy = %strategy.name(),
        bars = live.len(),
        start = %config.start_date,
        end = %config.end_date,
        "starting backtest"
    );

    let mut portfolio = Portfolio::new(config.initial_cash, config.commission_rate);
    let mut records = Vec::with_capacity(live.len());
    let mut price_map: HashMap<String, f64> = HashMap::new();

    for bar in live {
        let outcome = strategy.on_bar(bar, &mut portfolio)?;
        if bar.has_valid_close() {
            price_map.insert(symbol.to_string(), bar.close);
        }
        let equity = portfolio.total_equity(&price_map);
        portfolio.record_equity(bar.date, equity);
        records.push(BarRecord {
            date: bar.date,
            close: bar.close,
            outcome,
        });
    }

    let metrics = Metrics::compute(&portfolio);
    tracing::info!(
        symbol,
        final_equity = metrics.final_equity,
        total_return = metrics.total_return,
        trades = metrics.trade_count,
        "backtest finished"
    );

    Ok(BacktestResult {
        portfolio,
        records,
        metrics,
    })
}
