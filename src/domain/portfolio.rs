//! Simulated brokerage ledger: cash, positions, fills and equity tracking.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::bar::is_valid_price;
use super::error::{BreadfreeError, Result};
use super::position::{ClosedTrade, Fill, Position, Side};
use super::sizing::order_cost;
use crate::ports::broker_port::Broker;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub commission_rate: f64,
    pub positions: HashMap<String, Position>,
    pub fills: Vec<Fill>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_cash: f64, commission_rate: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            commission_rate,
            positions: HashMap::new(),
            fills: Vec::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn commission(&self, trade_value: f64) -> f64 {
        trade_value * self.commission_rate
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    /// Cash plus positions valued at `price_map`; positions without a price
    /// are valued at their average cost.
    pub fn total_equity(&self, price_map: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .values()
            .map(|pos| {
                let price = price_map.get(&pos.symbol).copied().unwrap_or(pos.avg_price);
                pos.market_value(price)
            })
            .sum();
        self.cash + position_value
    }

    fn check_order(symbol: &str, price: f64, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return Err(BreadfreeError::InvalidOrder {
                symbol: symbol.to_string(),
                reason: format!("quantity must be positive, got {quantity}"),
            });
        }
        if !is_valid_price(price) {
            return Err(BreadfreeError::InvalidOrder {
                symbol: symbol.to_string(),
                reason: format!("price must be positive, got {price}"),
            });
        }
        Ok(())
    }
}

impl Broker for Portfolio {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    fn position(&self, symbol: &str) -> Option<i64> {
        self.positions.get(symbol).map(|p| p.quantity)
    }

    fn buy(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()> {
        Self::check_order(symbol, price, quantity)?;

        let cost = price * quantity as f64;
        let total_cost = order_cost(price, quantity, self.commission_rate);
        let commission = total_cost - cost;
        if total_cost > self.cash {
            return Err(BreadfreeError::InsufficientFunds {
                symbol: symbol.to_string(),
                required: total_cost,
                available: self.cash,
            });
        }

        self.cash -= total_cost;

        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position {
                symbol: symbol.to_string(),
                quantity: 0,
                avg_price: 0.0,
                open_commission: 0.0,
                entry_date: date,
            });
        let new_quantity = position.quantity + quantity;
        position.avg_price =
            (position.avg_price * position.quantity as f64 + cost) / new_quantity as f64;
        position.quantity = new_quantity;
        position.open_commission += commission;

        self.fills.push(Fill {
            date,
            symbol: symbol.to_string(),
            side: Side::Buy,
            price,
            quantity,
            commission,
        });
        tracing::debug!(
            %date,
            symbol,
            side = %Side::Buy,
            price,
            quantity,
            commission,
            cash = self.cash,
            "order filled"
        );
        Ok(())
    }

    fn sell(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()> {
        Self::check_order(symbol, price, quantity)?;

        let held = self
            .positions
            .get(symbol)
            .map(|p| p.quantity)
            .ok_or_else(|| BreadfreeError::NoPosition {
                symbol: symbol.to_string(),
            })?;
        if quantity > held {
            return Err(BreadfreeError::InvalidOrder {
                symbol: symbol.to_string(),
                reason: format!("cannot sell {quantity}, only {held} held"),
            });
        }

        let proceeds = price * quantity as f64;
        let commission = self.commission(proceeds);
        self.cash += proceeds - commission;

        let remove = {
            let Some(position) = self.positions.get_mut(symbol) else {
                return Err(BreadfreeError::NoPosition {
                    symbol: symbol.to_string(),
                });
            };
            let entry_commission = position.open_commission * quantity as f64 / held as f64;
            position.open_commission -= entry_commission;
            position.quantity -= quantity;

            self.closed_trades.push(ClosedTrade {
                symbol: symbol.to_string(),
                quantity,
                entry_price: position.avg_price,
                exit_price: price,
                entry_date: position.entry_date,
                exit_date: date,
                pnl: quantity as f64 * (price - position.avg_price) - entry_commission - commission,
            });
            position.quantity == 0
        };
        if remove {
            self.positions.remove(symbol);
        }

        self.fills.push(Fill {
            date,
            symbol: symbol.to_string(),
            side: Side::Sell,
            price,
            quantity,
            commission,
        });
        tracing::debug!(
            %date,
            symbol,
            side = %Side::Sell,
            price,
            quantity,
            commission,
            cash = self.cash,
            "order filled"
        );
        Ok(())
    }
}
