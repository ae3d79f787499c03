#![allow(dead_code)]

use breadfree::domain::bar::Bar;
use breadfree::domain::crossover::MaWindows;
use breadfree::domain::error::{BreadfreeError, Result};
use breadfree::domain::sizing::SizingPolicy;
use breadfree::domain::strategy::DoubleMaStrategy;
use breadfree::ports::broker_port::Broker;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Buy {
        date: NaiveDate,
        symbol: String,
        price: f64,
        quantity: i64,
    },
    Sell {
        date: NaiveDate,
        symbol: String,
        price: f64,
        quantity: i64,
    },
}

impl Order {
    pub fn quantity(&self) -> i64 {
        match self {
            Order::Buy { quantity, .. } | Order::Sell { quantity, .. } => *quantity,
        }
    }
}

/// Broker that records orders without applying them. Account state is set
/// directly by the test.
pub struct RecordingBroker {
    pub cash: f64,
    pub commission_rate: f64,
    pub positions: HashMap<String, i64>,
    pub orders: Vec<Order>,
    pub reject_with: Option<String>,
}

impl RecordingBroker {
    pub fn new(cash: f64, commission_rate: f64) -> Self {
        Self {
            cash,
            commission_rate,
            positions: HashMap::new(),
            orders: Vec::new(),
            reject_with: None,
        }
    }

    pub fn with_position(mut self, symbol: &str, quantity: i64) -> Self {
        self.positions.insert(symbol.to_string(), quantity);
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<()> {
        match &self.reject_with {
            Some(reason) => Err(BreadfreeError::InvalidOrder {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Broker for RecordingBroker {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn commission_rate(&self) -> f64 {
        self.commission_rate
    }

    fn position(&self, symbol: &str) -> Option<i64> {
        self.positions.get(symbol).copied()
    }

    fn buy(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()> {
        self.check(symbol)?;
        self.orders.push(Order::Buy {
            date,
            symbol: symbol.to_string(),
            price,
            quantity,
        });
        Ok(())
    }

    fn sell(&mut self, date: NaiveDate, symbol: &str, price: f64, quantity: i64) -> Result<()> {
        self.check(symbol)?;
        self.orders.push(Order::Sell {
            date,
            symbol: symbol.to_string(),
            price,
            quantity,
        });
        Ok(())
    }
}

pub const SYMBOL: &str = "510050";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive daily bars starting 2024-01-01.
pub fn bars(closes: &[f64]) -> Vec<Bar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar::new(start + chrono::Duration::days(i as i64), close))
        .collect()
}

pub fn strategy(
    short: usize,
    long: usize,
    lot_size: i64,
    max_position_pct: f64,
) -> DoubleMaStrategy {
    let mut s = DoubleMaStrategy::new(
        MaWindows::new(short, long).unwrap(),
        SizingPolicy::new(lot_size, max_position_pct).unwrap(),
    );
    s.set_symbol(SYMBOL);
    s
}

/// With windows (2, 4), the next bar is a golden cross when its close is
/// above 15.
pub fn golden_setup() -> Vec<f64> {
    vec![10.0, 10.0, 10.0, 10.0, 5.0]
}

/// With windows (2, 4), the next bar is a death cross when its close is
/// below 5.
pub fn death_setup() -> Vec<f64> {
    vec![10.0, 10.0, 10.0, 10.0, 15.0]
}

pub fn write_csv(dir: &std::path::Path, symbol: &str, rows: &[(NaiveDate, f64)]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for (d, close) in rows {
        if close.is_nan() {
            content.push_str(&format!("{},1,1,1,,100\n", d.format("%Y-%m-%d")));
        } else {
            content.push_str(&format!("{},{c},{c},{c},{c},100\n", d.format("%Y-%m-%d"), c = close));
        }
    }
    std::fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}
