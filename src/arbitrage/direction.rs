//! Turns signed pool deltas into buy/sell instructions and normalizes
//! on-chain token order against the caller's asset/currency roles.
//!
//! This is the only place that decides whether a pool is inverted.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Signed;

use crate::dex::price::{amount_to_decimal, invert_price, price_from_sqrt_x96};
use crate::dex::state::PoolSnapshot;
use crate::errors::{AppError, Result};
use crate::models::{QuoteMethod, SwapDelta, TokenRoles, TradeDirection, TradePlan};
use crate::utils::bigint_to_u256;

/// True when on-chain `token0` is the currency rather than the asset.
pub fn is_inverted(snapshot: &PoolSnapshot, roles: &TokenRoles) -> Result<bool> {
    if snapshot.token0 == roles.asset && snapshot.token1 == roles.currency {
        Ok(false)
    } else if snapshot.token0 == roles.currency && snapshot.token1 == roles.asset {
        Ok(true)
    } else {
        Err(AppError::TokenMismatch(format!(
            "pool {} holds ({}, {}), expected asset {} and currency {}",
            snapshot.address, snapshot.token0, snapshot.token1, roles.asset, roles.currency
        )))
    }
}

/// Currency-per-asset price for a pool sqrt price.
pub fn display_price(snapshot: &PoolSnapshot, sqrt_price_x96: U256, inverted: bool) -> Result<BigDecimal> {
    let token1_per_token0 =
        price_from_sqrt_x96(sqrt_price_x96, snapshot.decimals0, snapshot.decimals1)?;
    if inverted {
        invert_price(&token1_per_token0)
    } else {
        Ok(token1_per_token0)
    }
}

/// Token1-per-token0 price for a currency-per-asset price.
pub fn pool_price(display: &BigDecimal, inverted: bool) -> Result<BigDecimal> {
    if inverted {
        invert_price(display)
    } else {
        Ok(display.clone())
    }
}

fn magnitude(amount: &BigInt) -> Result<U256> {
    bigint_to_u256(&amount.abs())
        .ok_or_else(|| AppError::Precision(format!("amount {amount} overflows U256")))
}

/// Build the trade plan for `delta`, which moves the pool to
/// `end_sqrt_price_x96`.
///
/// A positive amount enters the pool, so the user sells that token; a
/// negative amount leaves it, so the user buys it. A zero delta yields a
/// no-op plan. The returned plan is tagged [`QuoteMethod::SingleRange`] with
/// no crossings; callers that walked ticks overwrite both.
pub fn resolve(
    snapshot: &PoolSnapshot,
    delta: &SwapDelta,
    roles: &TokenRoles,
    end_sqrt_price_x96: U256,
) -> Result<TradePlan> {
    if !delta.is_consistent() {
        return Err(AppError::InconsistentDelta {
            amount0: delta.amount0.to_string(),
            amount1: delta.amount1.to_string(),
        });
    }
    let inverted = is_inverted(snapshot, roles)?;
    let start_price = display_price(snapshot, snapshot.sqrt_price_x96, inverted)?;
    let end_price = display_price(snapshot, end_sqrt_price_x96, inverted)?;

    // Map token0/token1 amounts onto asset/currency.
    let (asset_delta, currency_delta, asset_decimals, currency_decimals) = if inverted {
        (&delta.amount1, &delta.amount0, snapshot.decimals1, snapshot.decimals0)
    } else {
        (&delta.amount0, &delta.amount1, snapshot.decimals0, snapshot.decimals1)
    };

    let direction = if asset_delta.is_negative() || currency_delta.is_positive() {
        TradeDirection::BuyAsset
    } else if asset_delta.is_positive() || currency_delta.is_negative() {
        TradeDirection::SellAsset
    } else {
        TradeDirection::NoOp
    };

    let asset_amount = magnitude(asset_delta)?;
    let currency_amount = magnitude(currency_delta)?;
    let (sell_token, buy_token, sell_amount, buy_amount_estimate) = match direction {
        TradeDirection::SellAsset => (roles.asset, roles.currency, asset_amount, currency_amount),
        TradeDirection::BuyAsset | TradeDirection::NoOp => {
            (roles.currency, roles.asset, currency_amount, asset_amount)
        }
    };

    let execution_price = if asset_amount.is_zero() || direction == TradeDirection::NoOp {
        None
    } else {
        Some(
            amount_to_decimal(currency_amount, currency_decimals)
                / amount_to_decimal(asset_amount, asset_decimals),
        )
    };

    Ok(TradePlan {
        pool: snapshot.address,
        direction,
        sell_token,
        buy_token,
        sell_amount,
        buy_amount_estimate,
        start_price,
        end_price,
        execution_price,
        is_inverted: inverted,
        method: QuoteMethod::SingleRange,
        boundaries_crossed: 0,
    })
}
