use alloy_primitives::{Address, U256};

use crate::errors::{AppError, Result};

/// Immutable snapshot of a concentrated-liquidity pool, captured for one
/// quoting call and never reused across calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub decimals0: u8,
    pub decimals1: u8,
    /// Current sqrt(token1/token0) in Q64.96 (`slot0.sqrtPriceX96` / `globalState.price`).
    pub sqrt_price_x96: U256,
    /// Current tick index.
    pub tick: i32,
    pub tick_spacing: i32,
    /// In-range liquidity L, raw uint128 value.
    pub liquidity: u128,
    /// Swap fee in hundredths of a bip (3000 = 0.3%).
    pub fee_pips: u32,
}

impl PoolSnapshot {
    /// Zero liquidity or an uninitialized price make the pool unusable for
    /// simulation.
    pub fn ensure_quotable(&self) -> Result<()> {
        if self.sqrt_price_x96.is_zero() {
            return Err(AppError::PoolUnavailable(format!(
                "pool {} has zero sqrt price",
                self.address
            )));
        }
        if self.liquidity == 0 {
            return Err(AppError::PoolUnavailable(format!(
                "pool {} has zero in-range liquidity",
                self.address
            )));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::errors::AppError;

    #[test]
    fn zero_liquidity_is_unavailable() {
        let pool = unit_pool(0, 60);
        assert!(matches!(
            pool.ensure_quotable(),
            Err(AppError::PoolUnavailable(_))
        ));
    }

    #[test]
    fn zero_price_is_unavailable() {
        let mut pool = unit_pool(1_000, 60);
        pool.sqrt_price_x96 = alloy_primitives::U256::ZERO;
        assert!(matches!(
            pool.ensure_quotable(),
            Err(AppError::PoolUnavailable(_))
        ));
    }

    #[test]
    fn live_pool_is_quotable() {
        assert!(unit_pool(1_000, 60).ensure_quotable().is_ok());
    }
}
