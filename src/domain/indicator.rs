//! Simple moving average over a close price slice.
//!
//! SMA(n) at `end` = (P[end-n] + ... + P[end-1]) / n
//! Undefined until `n` points are available.

pub fn rolling_mean(values: &[f64], window: usize, end: usize) -> Option<f64> {
    if window == 0 || end < window || end > values.len() {
        return None;
    }
    let sum: f64 = values[end - window..end].iter().sum();
    Some(sum / window as f64)
}
