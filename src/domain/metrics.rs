//! Performance summary of a finished run.

use super::portfolio::{EquityPoint, Portfolio};

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return: f64,
    /// Largest peak-to-trough fall as a fraction of the peak.
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub trades_won: usize,
    pub win_rate: f64,
    pub total_commission: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let initial = portfolio.initial_cash;
        let final_equity = portfolio
            .equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial);

        let total_return = if initial > 0.0 {
            (final_equity - initial) / initial
        } else {
            0.0
        };

        let trade_count = portfolio.closed_trades.len();
        let trades_won = portfolio.closed_trades.iter().filter(|t| t.pnl > 0.0).count();
        let win_rate = if trade_count > 0 {
            trades_won as f64 / trade_count as f64
        } else {
            0.0
        };

        Metrics {
            final_equity,
            total_return,
            max_drawdown: compute_drawdown(&portfolio.equity_curve),
            trade_count,
            trades_won,
            win_rate,
            total_commission: portfolio.fills.iter().map(|f| f.commission).sum(),
        }
    }
}

fn compute_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    for point in curve {
        if point.equity > peak {
            peak = point.equity;
        }
        if peak > 0.0 {
            let drawdown = (peak - point.equity) / peak;
            max_drawdown = max_drawdown.max(drawdown);
        }
    }
    max_drawdown
}
