//! Bar-driven strategies.
//!
//! [`DoubleMaStrategy`] buys on a golden cross and sells on a death cross,
//! sizing orders with [`size_buy`] / [`size_sell`]. [`BuyAndHoldStrategy`]
//! is the benchmark: it buys once and never sells. [`StrategyKind`] is the
//! closed set of strategies a run can be configured with.
//!
//! Every call to `on_bar` returns a [`BarOutcome`] naming what happened on
//! that bar. Only errors raised by the broker (and a missing symbol) escape
//! as `Err`; skipped bars are outcomes, not errors.

use std::fmt;
use std::str::FromStr;

use super::bar::Bar;
use super::crossover::{self, MaWindows, Signal};
use super::error::{BreadfreeError, Result};
use super::history::PriceHistory;
use super::sizing::{BuySizing, SellSizing, SizingPolicy, size_buy, size_sell};
use crate::ports::broker_port::Broker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than `long_window` prices seen.
    Warming,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarOutcome {
    /// Close was NaN, infinite or non-positive; the bar was dropped.
    InvalidPrice,
    Warming,
    NoSignal,
    /// Golden cross while a position is already open.
    AlreadyHolding,
    InvalidCostBasis,
    InsufficientFunds,
    Bought { quantity: i64, fallback: bool },
    /// Death cross with nothing to sell.
    NoPositionToSell,
    Sold { quantity: i64, liquidated: bool },
}

impl BarOutcome {
    pub fn is_order(&self) -> bool {
        matches!(self, BarOutcome::Bought { .. } | BarOutcome::Sold { .. })
    }
}

fn require_symbol(symbol: &Option<String>) -> Result<&str> {
    symbol.as_deref().ok_or(BreadfreeError::SymbolNotSet)
}

/// Size and submit a buy at `bar.close`.
fn enter(
    policy: &SizingPolicy,
    symbol: &str,
    bar: &Bar,
    broker: &mut dyn Broker,
) -> Result<BarOutcome> {
    let date = bar.date;
    let price = bar.close;
    let sizing = size_buy(policy, broker.cash(), broker.commission_rate(), price);

    let (quantity, fallback) = match sizing {
        BuySizing::Lots { quantity } => (quantity, false),
        BuySizing::FallbackLot { quantity } => {
            tracing::warn!(
                %date,
                symbol,
                lot_size = policy.lot_size(),
                "target allocation below one lot, falling back to a single lot"
            );
            (quantity, true)
        }
        BuySizing::InvalidCostBasis { est_share_cost } => {
            tracing::error!(
                %date,
                symbol,
                est_share_cost,
                "invalid estimated share cost, skipping buy"
            );
            return Ok(BarOutcome::InvalidCostBasis);
        }
        BuySizing::InsufficientFunds {
            target_cash,
            lot_cost,
            cash,
        } => {
            tracing::info!(
                %date,
                symbol,
                target_cash,
                lot_cost,
                cash,
                "not enough funds to buy a lot"
            );
            return Ok(BarOutcome::InsufficientFunds);
        }
    };

    tracing::info!(%date, symbol, quantity, price, "executing buy");
    broker.buy(date, symbol, price, quantity)?;
    Ok(BarOutcome::Bought { quantity, fallback })
}

/// Size and submit a sell of `held` shares at `bar.close`.
fn exit(
    policy: &SizingPolicy,
    symbol: &str,
    held: i64,
    bar: &Bar,
    broker: &mut dyn Broker,
) -> Result<BarOutcome> {
    let date = bar.date;
    let price = bar.close;

    let (quantity, liquidated) = match size_sell(policy, held) {
        SellSizing::Lots { quantity } => (quantity, false),
        SellSizing::Liquidate { quantity } => {
            tracing::info!(
                %date,
                symbol,
                held,
                "holding less than one lot, selling entire holding"
            );
            (quantity, true)
        }
        SellSizing::Nothing => {
            tracing::info!(%date, symbol, "no shares to sell");
            return Ok(BarOutcome::NoPositionToSell);
        }
    };

    tracing::info!(%date, symbol, quantity, price, "executing sell");
    broker.sell(date, symbol, price, quantity)?;
    Ok(BarOutcome::Sold {
        quantity,
        liquidated,
    })
}

/// Double moving-average crossover strategy for one symbol.
#[derive(Debug, Clone)]
pub struct DoubleMaStrategy {
    windows: MaWindows,
    policy: SizingPolicy,
    history: PriceHistory,
    symbol: Option<String>,
}

impl DoubleMaStrategy {
    pub fn new(windows: MaWindows, policy: SizingPolicy) -> Self {
        DoubleMaStrategy {
            windows,
            policy,
            history: PriceHistory::new(),
            symbol: None,
        }
    }

    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = Some(symbol.into());
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Seed history before live bars arrive. Prices are taken as given.
    pub fn preload(&mut self, closes: Vec<f64>) {
        self.history.preload(closes);
        tracing::info!(
            bars = self.history.len(),
            phase = ?self.phase(),
            "double MA strategy preloaded history"
        );
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn windows(&self) -> MaWindows {
        self.windows
    }

    pub fn policy(&self) -> &SizingPolicy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        if self.history.len() < self.windows.long() {
            Phase::Warming
        } else {
            Phase::Armed
        }
    }

    pub fn on_bar(&mut self, bar: &Bar, broker: &mut dyn Broker) -> Result<BarOutcome> {
        let symbol = require_symbol(&self.symbol)?;
        let date = bar.date;

        if !self.history.append(bar.close) {
            tracing::warn!(%date, symbol, close = bar.close, "invalid close price, skipping bar");
            return Ok(BarOutcome::InvalidPrice);
        }

        if self.history.len() < self.windows.long() {
            return Ok(BarOutcome::Warming);
        }

        match crossover::detect(self.history.as_slice(), self.windows) {
            Signal::None => Ok(BarOutcome::NoSignal),
            Signal::GoldenCross => {
                if broker.position(symbol).is_some() {
                    tracing::debug!(%date, symbol, "golden cross while holding, no re-entry");
                    return Ok(BarOutcome::AlreadyHolding);
                }
                tracing::info!(%date, symbol, "golden cross detected, preparing to buy");
                enter(&self.policy, symbol, bar, broker)
            }
            Signal::DeathCross => {
                let Some(held) = broker.position(symbol) else {
                    tracing::debug!(%date, symbol, "death cross with no open position");
                    return Ok(BarOutcome::NoPositionToSell);
                };
                tracing::info!(%date, symbol, "death cross detected, preparing to sell");
                exit(&self.policy, symbol, held, bar, broker)
            }
        }
    }
}

/// Benchmark: buy on the first valid bar and hold to the end.
#[derive(Debug, Clone)]
pub struct BuyAndHoldStrategy {
    policy: SizingPolicy,
    symbol: Option<String>,
    entered: bool,
}

impl BuyAndHoldStrategy {
    pub fn new(policy: SizingPolicy) -> Self {
        BuyAndHoldStrategy {
            policy,
            symbol: None,
            entered: false,
        }
    }

    pub fn set_symbol(&mut self, symbol: impl Into<String>) {
        self.symbol = Some(symbol.into());
    }

    pub fn on_bar(&mut self, bar: &Bar, broker: &mut dyn Broker) -> Result<BarOutcome> {
        let symbol = require_symbol(&self.symbol)?;

        if !bar.has_valid_close() {
            tracing::warn!(
                date = %bar.date,
                symbol,
                close = bar.close,
                "invalid close price, skipping bar"
            );
            return Ok(BarOutcome::InvalidPrice);
        }
        if self.entered {
            return Ok(BarOutcome::NoSignal);
        }
        if broker.position(symbol).is_some() {
            self.entered = true;
            return Ok(BarOutcome::AlreadyHolding);
        }

        let outcome = enter(&self.policy, symbol, bar, broker)?;
        if outcome.is_order() {
            self.entered = true;
        }
        Ok(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyName {
    DoubleMa,
    BuyAndHold,
}

impl FromStr for StrategyName {
    type Err = BreadfreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "double_ma" | "doublema" | "doublemastrategy" => Ok(StrategyName::DoubleMa),
            "benchmark" | "buy_and_hold" | "benchmarkstrategy" => Ok(StrategyName::BuyAndHold),
            other => Err(BreadfreeError::invalid(
                "strategy",
                "name",
                format!("unknown strategy '{other}' (expected double_ma or benchmark)"),
            )),
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyName::DoubleMa => write!(f, "double_ma"),
            StrategyName::BuyAndHold => write!(f, "benchmark"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StrategyKind {
    DoubleMa(DoubleMaStrategy),
    BuyAndHold(BuyAndHoldStrategy),
}

impl StrategyKind {
    pub fn name(&self) -> StrategyName {
        match self {
            StrategyKind::DoubleMa(_) => StrategyName::DoubleMa,
            StrategyKind::BuyAndHold(_) => StrategyName::BuyAndHold,
        }
    }

    pub fn set_symbol(&mut self, symbol: &str) {
        match self {
            StrategyKind::DoubleMa(s) => s.set_symbol(symbol),
            StrategyKind::BuyAndHold(s) => s.set_symbol(symbol),
        }
    }

    /// Buy-and-hold has no use for history and ignores it.
    pub fn preload(&mut self, closes: Vec<f64>) {
        match self {
            StrategyKind::DoubleMa(s) => s.preload(closes),
            StrategyKind::BuyAndHold(_) => {}
        }
    }

    pub fn on_bar(&mut self, bar: &Bar, broker: &mut dyn Broker) -> Result<BarOutcome> {
        match self {
            StrategyKind::DoubleMa(s) => s.on_bar(bar, broker),
            StrategyKind::BuyAndHold(s) => s.on_bar(bar, broker),
        }
    }
}
