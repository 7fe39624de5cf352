//! Tick/price conversions and liquidity-boundary enumeration.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::One;
use uniswap_v3_math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio,
};

use crate::dex::price::{pow10, sqrt_x96_from_price};
use crate::errors::{AppError, Result};

/// Greatest tick whose sqrt price is `<= sqrt_price_x96` (on-chain convention).
pub fn tick_from_sqrt_x96(sqrt_price_x96: U256) -> Result<i32> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(AppError::Precision(format!(
            "sqrt price {sqrt_price_x96} outside the tick range"
        )));
    }
    get_tick_at_sqrt_ratio(sqrt_price_x96).map_err(|e| AppError::Precision(e.to_string()))
}

/// `floor(log(price_raw) / log(1.0001))` for a decimal token1-per-token0 price.
///
/// The Q64.96 route lands within one tick; the result is then settled
/// against `1.0001^tick` so exact tick prices map to their own tick.
pub fn tick_from_price(price: &BigDecimal, decimals0: u8, decimals1: u8) -> Result<i32> {
    let mut tick = tick_from_sqrt_x96(sqrt_x96_from_price(price, decimals0, decimals1)?)?;
    let raw = price * pow10(decimals1 as i64 - decimals0 as i64);
    if tick < MAX_TICK && raw >= tick_base_pow(tick + 1) {
        tick += 1;
    } else if tick > MIN_TICK && raw < tick_base_pow(tick) {
        tick -= 1;
    }
    Ok(tick)
}

/// Significant digits kept while raising the tick base.
const TICK_POW_PRECISION: u64 = 100;

/// `1.0001^tick`, rounded to [`TICK_POW_PRECISION`] digits.
fn tick_base_pow(tick: i32) -> BigDecimal {
    let mut base = BigDecimal::new(BigInt::from(10_001), 4);
    let mut acc = BigDecimal::one();
    let mut exp = tick.unsigned_abs();
    while exp > 0 {
        if exp & 1 == 1 {
            acc = (&acc * &base).with_prec(TICK_POW_PRECISION);
        }
        base = (&base * &base).with_prec(TICK_POW_PRECISION);
        exp >>= 1;
    }
    if tick < 0 { BigDecimal::one() / acc } else { acc }
}

pub fn sqrt_x96_at_tick(tick: i32) -> Result<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(AppError::Precision(format!("tick {tick} outside the tick range")));
    }
    get_sqrt_ratio_at_tick(tick).map_err(|e| AppError::Precision(e.to_string()))
}

pub(crate) fn check_spacing(tick_spacing: i32) -> Result<()> {
    if tick_spacing <= 0 {
        return Err(AppError::ParameterRange(format!(
            "tick spacing must be positive, got {tick_spacing}"
        )));
    }
    Ok(())
}

/// Largest multiple of `tick_spacing` that is `<= tick`.
pub fn floor_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing) * tick_spacing
}

/// Next boundary a price moving away from `tick` will reach.
///
/// Upward it is the first multiple strictly above `tick`; downward it is the
/// multiple at or below `tick`, because the range `[b, b + spacing)` is left
/// as soon as the price drops below `b`.
pub fn next_boundary(tick: i32, tick_spacing: i32, upward: bool) -> i32 {
    let base = floor_to_spacing(tick, tick_spacing);
    if upward { base + tick_spacing } else { base }
}

/// Every boundary crossed moving from `start_tick` to `end_tick`, in travel
/// order. An empty result means liquidity stays constant over the move.
pub fn boundaries_crossed(start_tick: i32, end_tick: i32, tick_spacing: i32) -> Result<Vec<i32>> {
    check_spacing(tick_spacing)?;
    let mut out = Vec::new();
    if end_tick > start_tick {
        let mut b = next_boundary(start_tick, tick_spacing, true);
        while b <= end_tick {
            out.push(b);
            b += tick_spacing;
        }
    } else if end_tick < start_tick {
        let mut b = next_boundary(start_tick, tick_spacing, false);
        while b > end_tick {
            out.push(b);
            b -= tick_spacing;
        }
    }
    Ok(out)
}
