//! Append-only close price buffer for a single symbol.

use super::bar::is_valid_price;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    closes: Vec<f64>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a close if it is a valid price. Returns `false` when rejected.
    pub fn append(&mut self, price: f64) -> bool {
        if !is_valid_price(price) {
            return false;
        }
        self.closes.push(price);
        true
    }

    /// Replace the buffer wholesale. The caller supplies pre-cleaned prices.
    pub fn preload(&mut self, prices: Vec<f64>) {
        self.closes = prices;
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.closes
    }
}
