//! Shared data structures used throughout the application.

use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::errors::AppError;

/// Conditional outcome a pool is priced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeSide {
    Yes,
    No,
}

impl fmt::Display for OutcomeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeSide::Yes => f.write_str("YES"),
            OutcomeSide::No => f.write_str("NO"),
        }
    }
}

impl FromStr for OutcomeSide {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" => Ok(OutcomeSide::Yes),
            "no" => Ok(OutcomeSide::No),
            other => Err(AppError::ParameterRange(format!(
                "outcome side must be yes or no, got {other:?}"
            ))),
        }
    }
}

/// Caller inputs for one planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeParameters {
    /// Fair spot price, currency per asset.
    pub spot_price: BigDecimal,
    /// Estimated probability the event happens, in `[0, 1]`.
    pub probability: BigDecimal,
    /// Expected fractional price change if the event happens.
    pub impact: BigDecimal,
}

impl TradeParameters {
    pub fn new(spot_price: BigDecimal, probability: BigDecimal, impact: BigDecimal) -> Self {
        Self {
            spot_price,
            probability,
            impact,
        }
    }
}

/// The caller's semantic ordering of a pool's two tokens.
///
/// Prices are always reported as `currency` per `asset`, whatever order the
/// tokens have on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRoles {
    pub asset: Address,
    pub currency: Address,
}

/// Signed raw token amounts from the pool's point of view.
///
/// Positive = the token enters the pool, negative = it leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapDelta {
    pub amount0: BigInt,
    pub amount1: BigInt,
}

impl SwapDelta {
    pub fn new(amount0: BigInt, amount1: BigInt) -> Self {
        Self { amount0, amount1 }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    /// True when one side enters and the other leaves (or both are zero).
    pub fn is_consistent(&self) -> bool {
        !(self.amount0.is_positive() && self.amount1.is_positive()
            || self.amount0.is_negative() && self.amount1.is_negative())
    }
}

impl AddAssign<&SwapDelta> for SwapDelta {
    fn add_assign(&mut self, rhs: &SwapDelta) {
        self.amount0 += &rhs.amount0;
        self.amount1 += &rhs.amount1;
    }
}

/// Price a conditional pool should trade at.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPrice {
    pub side: OutcomeSide,
    /// Currency per asset.
    pub price: BigDecimal,
    /// The same price in the pool's own token1/token0 orientation, Q64.96.
    pub sqrt_price_x96: U256,
}

/// What the user does with the asset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    /// Sell currency, receive asset. Pushes currency-per-asset up.
    BuyAsset,
    /// Sell asset, receive currency. Pushes currency-per-asset down.
    SellAsset,
    /// Pool already sits at the target.
    NoOp,
}

/// Which simulator produced the amounts of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMethod {
    /// Constant-liquidity closed form; no boundary was crossed.
    SingleRange,
    /// Tick-by-tick walk across liquidity boundaries.
    MultiTick,
}

/// Normalized trade instruction for one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct TradePlan {
    pub pool: Address,
    pub direction: TradeDirection,
    pub sell_token: Address,
    pub buy_token: Address,
    /// Raw units of `sell_token` the user sends, before any pool fee.
    pub sell_amount: U256,
    /// Raw units of `buy_token` the user receives.
    pub buy_amount_estimate: U256,
    /// Currency per asset before the trade.
    pub start_price: BigDecimal,
    /// Currency per asset after the trade.
    pub end_price: BigDecimal,
    /// Average currency per asset paid or received; `None` for a no-op.
    pub execution_price: Option<BigDecimal>,
    /// On-chain token0 is the currency, not the asset.
    pub is_inverted: bool,
    pub method: QuoteMethod,
    pub boundaries_crossed: usize,
}

impl TradePlan {
    pub fn is_noop(&self) -> bool {
        self.direction == TradeDirection::NoOp
    }
}

impl fmt::Display for TradePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return write!(f, "pool {} already at target ({})", self.pool, self.start_price);
        }
        write!(
            f,
            "{:?}: sell {} of {} for ~{} of {} | price {} -> {}",
            self.direction,
            self.sell_amount,
            self.sell_token,
            self.buy_amount_estimate,
            self.buy_token,
            self.start_price.round(8),
            self.end_price.round(8),
        )?;
        if let Some(exec) = &self.execution_price {
            write!(f, " | avg {}", exec.round(8))?;
        }
        Ok(())
    }
}

/// Result of an exact-input single swap quote.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    /// Raw input consumed, fee included. Below the request only when the
    /// walk ran into the price limit.
    pub amount_in: U256,
    pub amount_out: U256,
    pub fee_amount: U256,
    /// Currency per asset before the swap.
    pub start_price: BigDecimal,
    /// Currency per asset after the swap.
    pub end_price: BigDecimal,
    pub boundaries_crossed: usize,
}
