//! Daily price bar.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Bar { date, close }
    }

    pub fn has_valid_close(&self) -> bool {
        is_valid_price(self.close)
    }
}

/// A price is usable when it is a finite number strictly above zero.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
