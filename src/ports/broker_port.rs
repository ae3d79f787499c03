//! Brokerage account port.
//!
//! Strategies read account state and submit orders through this trait; they
//! never touch cash or positions directly. Implementations apply fills and
//! may reject an order, in which case the error is returned unmodified to
//! whoever is driving the strategy.

use crate::domain::error::Result;
use chrono::NaiveDate;

pub trait Broker {
    fn cash(&self) -> f64;

    /// Commission as a fraction of traded value.
    fn commission_rate(&self) -> f64;

    /// Held quantity, `None` when there is no open position.
    fn position(&self, symbol: &str) -> Option<i64>;

    fn buy(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()>;

    fn sell(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()>;
}
