use alloy_primitives::U256;
use num_bigint::BigInt;
use num_traits::Signed;

use crate::dex::price::q96;
use crate::dex::state::PoolSnapshot;
use crate::errors::{AppError, Result};
use crate::models::SwapDelta;
use crate::utils::{bigint_to_u256, u256_to_bigint};

/// Fee denominator for `fee_pips` (hundredths of a bip).
pub const FEE_PIPS_DENOMINATOR: u32 = 1_000_000;

/// Deltas that move a pool from its current price to `target_sqrt_price_x96`
/// assuming the in-range liquidity stays constant.
///
/// Exact only when no tick boundary is crossed; use
/// [`crate::dex::walk::deltas_to_price_exact`] otherwise. Swap fees are not
/// modelled (see [`gross_up_for_fee`]).
pub fn deltas_to_price(snapshot: &PoolSnapshot, target_sqrt_price_x96: U256) -> Result<SwapDelta> {
    snapshot.ensure_quotable()?;
    segment_deltas(
        snapshot.sqrt_price_x96,
        target_sqrt_price_x96,
        snapshot.liquidity,
    )
}

/// Constant-liquidity deltas between two sqrt prices, in raw token units:
///
/// ```text
/// amount0 = L * (1/sqrt(P_target) - 1/sqrt(P_current))
/// amount1 = L * (sqrt(P_target) - sqrt(P_current))
/// ```
///
/// Amounts entering the pool round up, amounts leaving round toward zero.
pub(crate) fn segment_deltas(current: U256, target: U256, liquidity: u128) -> Result<SwapDelta> {
    if current.is_zero() || target.is_zero() {
        return Err(AppError::Precision(
            "zero sqrt price cannot be simulated".into(),
        ));
    }
    if current == target || liquidity == 0 {
        return Ok(SwapDelta::zero());
    }
    let sc = u256_to_bigint(current);
    let st = u256_to_bigint(target);
    let l = BigInt::from(liquidity);

    let amount1 = div_entering_up(&(&l * (&st - &sc)), &q96());
    let amount0 = div_entering_up(&(&l * q96() * (&sc - &st)), &(&sc * &st));
    Ok(SwapDelta::new(amount0, amount1))
}

/// Positive quotients (token entering the pool) round up, negative ones
/// truncate toward zero. `den` must be positive.
fn div_entering_up(num: &BigInt, den: &BigInt) -> BigInt {
    if num.is_positive() {
        (num + den - BigInt::from(1)) / den
    } else {
        num / den
    }
}

/// Input amount including the pool fee, for callers that want the gross
/// figure: `ceil(amount * 1e6 / (1e6 - fee_pips))`.
pub fn gross_up_for_fee(amount: U256, fee_pips: u32) -> Result<U256> {
    if fee_pips >= FEE_PIPS_DENOMINATOR {
        return Err(AppError::ParameterRange(format!(
            "fee of {fee_pips} pips leaves nothing to swap"
        )));
    }
    let num = u256_to_bigint(amount) * BigInt::from(FEE_PIPS_DENOMINATOR);
    let den = BigInt::from(FEE_PIPS_DENOMINATOR - fee_pips);
    bigint_to_u256(&div_entering_up(&num, &den))
        .ok_or_else(|| AppError::Precision("grossed-up amount overflows U256".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::price::sqrt_x96_from_price;
    use crate::dex::state::fixtures::unit_pool;
    use bigdecimal::BigDecimal;
    use num_traits::{ToPrimitive, Zero};
    use std::str::FromStr;

    fn target(price: &str) -> U256 {
        sqrt_x96_from_price(&BigDecimal::from_str(price).unwrap(), 18, 18).unwrap()
    }

    #[test]
    fn same_price_is_noop() {
        let pool = unit_pool(1_000_000_000_000_000_000_000_000, 60);
        let delta = deltas_to_price(&pool, pool.sqrt_price_x96).unwrap();
        assert!(delta.is_zero());
    }

    #[test]
    fn scenario_price_up_two_percent() {
        let l = 1_000_000_000_000_000_000_000_000u128; // 1e24
        let pool = unit_pool(l, 60);
        let delta = deltas_to_price(&pool, target("1.02")).unwrap();

        assert!(delta.amount1.is_positive(), "currency enters the pool");
        assert!(delta.amount0.is_negative(), "asset leaves the pool");

        // amount1 = L(sqrt(1.02) - 1), amount0 = L(1/sqrt(1.02) - 1)
        let a0 = delta.amount0.to_f64().unwrap();
        let a1 = delta.amount1.to_f64().unwrap();
        let s = 1.02f64.sqrt();
        let lf = l as f64;
        assert!((a1 / (lf * (s - 1.0)) - 1.0).abs() < 1e-9);
        assert!((a0 / (lf * (1.0 / s - 1.0)) - 1.0).abs() < 1e-9);

        // |amount0 * amount1| = L^2 (sqrt(1.02) - 1)^2 / sqrt(1.02), within 1% of L^2 (sqrt(1.02) - 1)^2
        let product = (a0 * a1).abs();
        let reference = lf * lf * (s - 1.0).powi(2);
        assert!((product / (reference / s) - 1.0).abs() < 1e-9);
        assert!((product / reference - 1.0).abs() < 0.011);
    }

    #[test]
    fn price_down_reverses_signs() {
        let pool = unit_pool(1_000_000_000_000_000_000, 60);
        let delta = deltas_to_price(&pool, target("0.97")).unwrap();
        assert!(delta.amount0.is_positive());
        assert!(delta.amount1.is_negative());
    }

    #[test]
    fn larger_moves_never_need_less() {
        let pool = unit_pool(5_000_000_000_000_000_000_000, 60);
        let mut last = SwapDelta::zero();
        for p in ["1.001", "1.01", "1.05", "1.2", "2"] {
            let delta = deltas_to_price(&pool, target(p)).unwrap();
            assert!(delta.amount0.abs() >= last.amount0.abs());
            assert!(delta.amount1.abs() >= last.amount1.abs());
            last = delta;
        }
    }

    #[test]
    fn zero_liquidity_is_unavailable() {
        let pool = unit_pool(0, 60);
        assert!(matches!(
            deltas_to_price(&pool, target("1.1")),
            Err(AppError::PoolUnavailable(_))
        ));
    }

    #[test]
    fn zero_target_is_precision_error() {
        let pool = unit_pool(1_000, 60);
        assert!(matches!(
            deltas_to_price(&pool, U256::ZERO),
            Err(AppError::Precision(_))
        ));
    }

    #[test]
    fn entering_amount_rounds_up() {
        // One unit of sqrt price movement with L = 1 still costs one unit in.
        let one = crate::dex::state::fixtures::q96();
        let delta = segment_deltas(one, one + U256::from(1u8), 1).unwrap();
        assert_eq!(delta.amount1, BigInt::from(1));
        assert!(delta.amount0.is_zero());
    }

    #[test]
    fn gross_up_matches_fee() {
        // 0.3% fee: 997 net needs 1000 gross.
        assert_eq!(
            gross_up_for_fee(U256::from(997u64), 3_000).unwrap(),
            U256::from(1_000u64)
        );
        assert_eq!(gross_up_for_fee(U256::from(500u64), 0).unwrap(), U256::from(500u64));
        assert!(gross_up_for_fee(U256::from(1u8), 1_000_000).is_err());
    }
}
