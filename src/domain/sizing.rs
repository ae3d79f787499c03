//! Lot-aligned position sizing.
//!
//! Buy sizing:
//! 1. target_cash = cash * clamp(max_position_pct, 0, 1)
//! 2. est_share_cost = price * (1 + commission_rate), must be > 0
//! 3. quantity = floor(floor(target_cash / est_share_cost) / lot_size) * lot_size
//! 4. If that is zero but the account can pay for one whole lot including
//!    commission, and buying is allowed at all, buy exactly one lot.
//!
//! Sell sizing rounds the holding down to whole lots, and sells an odd-lot
//! remainder outright when it is all that is held.

use super::error::{BreadfreeError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingPolicy {
    lot_size: i64,
    max_position_pct: f64,
}

impl SizingPolicy {
    pub fn new(lot_size: i64, max_position_pct: f64) -> Result<Self> {
        if lot_size <= 0 {
            return Err(BreadfreeError::invalid(
                "strategy",
                "lot_size",
                "lot_size must be positive",
            ));
        }
        if max_position_pct.is_nan() {
            return Err(BreadfreeError::invalid(
                "strategy",
                "max_position_pct",
                "max_position_pct must be a number",
            ));
        }
        Ok(SizingPolicy {
            lot_size,
            max_position_pct,
        })
    }

    pub fn lot_size(&self) -> i64 {
        self.lot_size
    }

    pub fn max_position_pct(&self) -> f64 {
        self.max_position_pct
    }

    fn round_to_lots(&self, shares: i64) -> i64 {
        (shares / self.lot_size) * self.lot_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuySizing {
    /// Whole lots within the cash allocation.
    Lots { quantity: i64 },
    /// The allocation could not cover a lot, but one lot is affordable.
    FallbackLot { quantity: i64 },
    InsufficientFunds {
        target_cash: f64,
        lot_cost: f64,
        cash: f64,
    },
    InvalidCostBasis { est_share_cost: f64 },
}

impl BuySizing {
    pub fn quantity(&self) -> i64 {
        match self {
            BuySizing::Lots { quantity } | BuySizing::FallbackLot { quantity } => *quantity,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellSizing {
    Lots { quantity: i64 },
    /// Less than one lot held; the whole remainder is sold.
    Liquidate { quantity: i64 },
    Nothing,
}

impl SellSizing {
    pub fn quantity(&self) -> i64 {
        match self {
            SellSizing::Lots { quantity } | SellSizing::Liquidate { quantity } => *quantity,
            SellSizing::Nothing => 0,
        }
    }
}

/// Cash needed to buy `quantity` shares at `price`, commission included.
/// The ledger charges exactly this amount.
pub fn order_cost(price: f64, quantity: i64, commission_rate: f64) -> f64 {
    price * quantity as f64 * (1.0 + commission_rate)
}

pub fn size_buy(policy: &SizingPolicy, cash: f64, commission_rate: f64, price: f64) -> BuySizing {
    let target_cash = cash * policy.max_position_pct.clamp(0.0, 1.0);

    let est_share_cost = price * (1.0 + commission_rate);
    if est_share_cost.is_nan() || est_share_cost <= 0.0 {
        return BuySizing::InvalidCostBasis { est_share_cost };
    }

    let max_shares = (target_cash / est_share_cost).floor() as i64;
    let mut quantity = policy.round_to_lots(max_shares);
    // the quotient can round up onto a lot boundary
    if quantity > 0 && order_cost(price, quantity, commission_rate) > target_cash {
        quantity -= policy.lot_size;
    }
    if quantity > 0 {
        return BuySizing::Lots { quantity };
    }

    let lot_cost = order_cost(price, policy.lot_size, commission_rate);
    if cash >= lot_cost && policy.max_position_pct > 0.0 {
        return BuySizing::FallbackLot {
            quantity: policy.lot_size,
        };
    }

    BuySizing::InsufficientFunds {
        target_cash,
        lot_cost,
        cash,
    }
}

pub fn size_sell(policy: &SizingPolicy, held: i64) -> SellSizing {
    let quantity = policy.round_to_lots(held);
    if quantity > 0 {
        SellSizing::Lots { quantity }
    } else if held > 0 {
        SellSizing::Liquidate { quantity: held }
    } else {
        SellSizing::Nothing
    }
}
