//! Price data access port.

use crate::domain::bar::Bar;
use crate::domain::error::Result;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` in `[start_date, end_date]`, oldest first.
    fn fetch_bars(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate)
    -> Result<Vec<Bar>>;
}
