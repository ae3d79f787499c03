//! Moving-average crossover detection.
//!
//! Compares the short and long simple moving averages at the two most recent
//! bars. The previous-bar comparison is non-strict and the current-bar
//! comparison is strict, so a bar where the averages were exactly equal
//! counts toward whichever side the averages move apart to.

use std::fmt;

use super::error::{BreadfreeError, Result};
use super::indicator::rolling_mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaWindows {
    short: usize,
    long: usize,
}

impl MaWindows {
    /// Both windows must be positive and `short < long`.
    pub fn new(short: usize, long: usize) -> Result<Self> {
        if short == 0 {
            return Err(BreadfreeError::invalid(
                "strategy",
                "short_window",
                "short_window must be positive",
            ));
        }
        if long == 0 {
            return Err(BreadfreeError::invalid(
                "strategy",
                "long_window",
                "long_window must be positive",
            ));
        }
        if short >= long {
            return Err(BreadfreeError::invalid(
                "strategy",
                "short_window",
                format!("short_window ({short}) must be less than long_window ({long})"),
            ));
        }
        Ok(MaWindows { short, long })
    }

    pub fn short(&self) -> usize {
        self.short
    }

    pub fn long(&self) -> usize {
        self.long
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    GoldenCross,
    DeathCross,
    None,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::GoldenCross => write!(f, "golden cross"),
            Signal::DeathCross => write!(f, "death cross"),
            Signal::None => write!(f, "none"),
        }
    }
}

/// Short/long averages at the previous and the current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverReading {
    pub prev_short: f64,
    pub prev_long: f64,
    pub cur_short: f64,
    pub cur_long: f64,
}

impl CrossoverReading {
    pub fn classify(&self) -> Signal {
        if self.prev_short <= self.prev_long && self.cur_short > self.cur_long {
            Signal::GoldenCross
        } else if self.prev_short >= self.prev_long && self.cur_short < self.cur_long {
            Signal::DeathCross
        } else {
            Signal::None
        }
    }
}

/// Averages for the last two bars, or `None` while fewer than `long + 1`
/// prices are available.
pub fn read(history: &[f64], windows: MaWindows) -> Option<CrossoverReading> {
    let len = history.len();
    if len <= windows.long {
        return None;
    }
    Some(CrossoverReading {
        prev_short: rolling_mean(history, windows.short, len - 1)?,
        prev_long: rolling_mean(history, windows.long, len - 1)?,
        cur_short: rolling_mean(history, windows.short, len)?,
        cur_long: rolling_mean(history, windows.long, len)?,
    })
}

pub fn detect(history: &[f64], windows: MaWindows) -> Signal {
    read(history, windows)
        .map(|reading| reading.classify())
        .unwrap_or(Signal::None)
}
