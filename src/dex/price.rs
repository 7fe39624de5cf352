//! Conversions between Q64.96 sqrt prices and decimal prices.
//!
//! A pool stores `sqrt(token1_raw / token0_raw) * 2^96`. The decimal price
//! (token1 per token0 in whole-token units) is that ratio scaled by
//! `10^(decimals0 - decimals1)`. Everything here works on `num-bigint`
//! integers and `bigdecimal` values; nothing passes through `f64`.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::errors::{AppError, Result};
use crate::utils::{bigint_to_u256, u256_to_bigint};

/// Widest sqrt price a pool can store (uint160).
pub const MAX_SQRT_PRICE_BITS: usize = 160;

pub fn q96() -> BigInt {
    BigInt::one() << 96
}

/// `10^exp` as an exact decimal; `exp` may be negative.
pub fn pow10(exp: i64) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -exp)
}

fn decimals_factor(decimals0: u8, decimals1: u8) -> BigDecimal {
    pow10(decimals0 as i64 - decimals1 as i64)
}

/// Decimal token1-per-token0 price of a Q64.96 sqrt price.
pub fn price_from_sqrt_x96(sqrt_price_x96: U256, decimals0: u8, decimals1: u8) -> Result<BigDecimal> {
    if sqrt_price_x96.is_zero() {
        return Err(AppError::Precision(
            "zero sqrt price is not a valid price".into(),
        ));
    }
    if sqrt_price_x96.bit_len() > MAX_SQRT_PRICE_BITS {
        return Err(AppError::Precision(format!(
            "sqrt price {sqrt_price_x96} exceeds {MAX_SQRT_PRICE_BITS} bits"
        )));
    }
    let sqrt = u256_to_bigint(sqrt_price_x96);
    let ratio = BigDecimal::from(&sqrt * &sqrt) / BigDecimal::from(BigInt::one() << 192);
    Ok(ratio * decimals_factor(decimals0, decimals1))
}

/// Q64.96 sqrt price for a decimal token1-per-token0 price, rounded to the
/// nearest fixed-point unit. Exact inverse of [`price_from_sqrt_x96`].
pub fn sqrt_x96_from_price(price: &BigDecimal, decimals0: u8, decimals1: u8) -> Result<U256> {
    if !price.is_positive() {
        return Err(AppError::Precision(format!(
            "price must be positive, got {price}"
        )));
    }
    let raw_ratio = price / decimals_factor(decimals0, decimals1);
    let sqrt = raw_ratio
        .sqrt()
        .ok_or_else(|| AppError::Precision(format!("no square root for {raw_ratio}")))?;
    let scaled = sqrt * BigDecimal::from(q96()) + BigDecimal::new(BigInt::from(5), 1);
    let (int, _) = scaled.with_scale(0).as_bigint_and_exponent();
    if int.is_zero() {
        return Err(AppError::Precision(format!(
            "price {price} underflows the Q64.96 range"
        )));
    }
    if int.bits() as usize > MAX_SQRT_PRICE_BITS {
        return Err(AppError::Precision(format!(
            "price {price} overflows the Q64.96 range"
        )));
    }
    bigint_to_u256(&int)
        .ok_or_else(|| AppError::Precision(format!("price {price} overflows U256")))
}

/// `1 / price`, used when a pool's token order is the reverse of the
/// caller's asset/currency order.
pub fn invert_price(price: &BigDecimal) -> Result<BigDecimal> {
    if price.is_zero() {
        return Err(AppError::Precision("cannot invert a zero price".into()));
    }
    Ok(BigDecimal::one() / price)
}

/// Raw token units to whole tokens.
pub fn amount_to_decimal(amount: U256, decimals: u8) -> BigDecimal {
    BigDecimal::new(u256_to_bigint(amount), decimals as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn relative_error(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        ((a - b) / b).abs()
    }

    #[test]
    fn q96_is_price_one() {
        let one = bigint_to_u256(&q96()).unwrap();
        assert_eq!(price_from_sqrt_x96(one, 18, 18).unwrap(), BigDecimal::one());
        assert_eq!(sqrt_x96_from_price(&BigDecimal::one(), 18, 18).unwrap(), one);
    }

    #[test]
    fn decimals_shift_the_price() {
        // Raw ratio 1 with 18 decimals on token0 and 6 on token1 is 1e12 token1 per token0.
        let one = bigint_to_u256(&q96()).unwrap();
        assert_eq!(price_from_sqrt_x96(one, 18, 6).unwrap(), dec("1e12"));
        assert_eq!(price_from_sqrt_x96(one, 6, 18).unwrap(), dec("1e-12"));
    }

    #[test]
    fn round_trip_across_decimal_pairs() {
        let tolerance = dec("1e-12");
        let prices = ["0.000123", "1", "1.02", "107.73", "2500.5", "98765.4321"];
        for d0 in [0u8, 6, 8, 18] {
            for d1 in [0u8, 6, 12, 18] {
                for p in prices {
                    let price = dec(p);
                    let sqrt = sqrt_x96_from_price(&price, d0, d1).unwrap();
                    let back = price_from_sqrt_x96(sqrt, d0, d1).unwrap();
                    assert!(
                        relative_error(&back, &price) < tolerance,
                        "price {p} d0={d0} d1={d1} came back as {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn non_positive_price_is_precision_error() {
        assert!(matches!(
            sqrt_x96_from_price(&BigDecimal::zero(), 18, 18),
            Err(AppError::Precision(_))
        ));
        assert!(matches!(
            sqrt_x96_from_price(&dec("-1.5"), 18, 18),
            Err(AppError::Precision(_))
        ));
    }

    #[test]
    fn overflow_is_precision_error() {
        // sqrt(1e40) * 2^96 needs ~163 bits.
        assert!(matches!(
            sqrt_x96_from_price(&dec("1e40"), 0, 0),
            Err(AppError::Precision(_))
        ));
        assert!(matches!(
            price_from_sqrt_x96(U256::from(1u8) << 200, 0, 0),
            Err(AppError::Precision(_))
        ));
    }

    #[test]
    fn underflow_is_precision_error() {
        assert!(matches!(
            sqrt_x96_from_price(&dec("1e-70"), 0, 0),
            Err(AppError::Precision(_))
        ));
    }

    #[test]
    fn zero_sqrt_is_precision_error() {
        assert!(matches!(
            price_from_sqrt_x96(U256::ZERO, 18, 18),
            Err(AppError::Precision(_))
        ));
    }

    #[test]
    fn inversion_and_amounts() {
        assert_eq!(invert_price(&dec("4")).unwrap(), dec("0.25"));
        assert!(invert_price(&BigDecimal::zero()).is_err());
        assert_eq!(amount_to_decimal(U256::from(1_500_000u64), 6), dec("1.5"));
    }
}
