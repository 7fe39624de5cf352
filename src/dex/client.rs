//! On-chain pool reads for Uniswap V3 and Algebra pools.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use ethers::providers::{Http, Provider};
use serde::Deserialize;

use crate::dex::state::PoolSnapshot;
use crate::errors::{AppError, Result};
use crate::utils::{address_from_ethers, address_to_ethers, u256_from_ethers};

mod bindings {
    use ethers::contract::abigen;

    abigen!(
        ConcentratedPool,
        r"[
            function token0() view returns (address)
            function token1() view returns (address)
            function tickSpacing() view returns (int24)
            function liquidity() view returns (uint128)
        ]",
    );

    abigen!(
        Erc20,
        r"[
            function decimals() view returns (uint8)
        ]",
    );
}

mod uniswap {
    use ethers::contract::abigen;

    abigen!(
        UniswapV3Pool,
        r"[
            function slot0() view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint8 feeProtocol, bool unlocked)
            function fee() view returns (uint24)
            function ticks(int24 tick) view returns (uint128 liquidityGross, int128 liquidityNet, uint256 feeGrowthOutside0X128, uint256 feeGrowthOutside1X128, int56 tickCumulativeOutside, uint160 secondsPerLiquidityOutsideX128, uint32 secondsOutside, bool initialized)
        ]",
    );
}

mod algebra {
    use ethers::contract::abigen;

    abigen!(
        AlgebraPool,
        r"[
            function globalState() view returns (uint160 price, int24 tick, uint16 fee, uint16 timepointIndex, uint8 communityFeeToken0, uint8 communityFeeToken1, bool unlocked)
            function ticks(int24 tick) view returns (uint128 liquidityTotal, int128 liquidityDelta, uint256 outerFeeGrowth0Token, uint256 outerFeeGrowth1Token, int56 outerTickCumulative, uint160 outerSecondsPerLiquidity, uint32 outerSecondsSpent, bool initialized)
        ]",
    );
}

use algebra::AlgebraPool;
use bindings::{ConcentratedPool, Erc20};
use uniswap::UniswapV3Pool;

/// Pool contract family. Both expose the same liquidity model; they differ
/// in where the price and fee live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolFlavor {
    /// `globalState()` and `ticks().liquidityDelta`.
    #[default]
    Algebra,
    /// `slot0()`, `fee()` and `ticks().liquidityNet`.
    Uniswap,
}

impl fmt::Display for PoolFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolFlavor::Algebra => f.write_str("algebra"),
            PoolFlavor::Uniswap => f.write_str("uniswap"),
        }
    }
}

impl FromStr for PoolFlavor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "algebra" => Ok(PoolFlavor::Algebra),
            "uniswap" | "uniswap-v3" | "uniswapv3" => Ok(PoolFlavor::Uniswap),
            other => Err(AppError::Config(format!("unknown pool flavor '{other}'"))),
        }
    }
}

/// Read access to pool state. Implemented over RPC by [`PoolClient`] and by
/// in-memory sources in tests.
#[allow(async_fn_in_trait)]
pub trait PoolDataSource {
    /// Fresh snapshot of `pool`, token decimals included.
    async fn snapshot(&self, pool: Address) -> Result<PoolSnapshot>;

    /// `liquidityNet` stored at an initialized tick boundary (zero otherwise).
    async fn liquidity_net(&self, pool: Address, tick: i32) -> Result<i128>;
}

/// Handle for reading concentrated-liquidity pools over JSON-RPC.
#[derive(Clone)]
pub struct PoolClient {
    provider: Arc<Provider<Http>>,
    flavor: PoolFlavor,
}

impl PoolClient {
    pub fn new(rpc_url: &str, flavor: PoolFlavor) -> Result<Self> {
        let provider = Arc::new(Provider::<Http>::try_from(rpc_url)?);
        Ok(Self { provider, flavor })
    }

    pub fn flavor(&self) -> PoolFlavor {
        self.flavor
    }

    async fn decimals(&self, token: ethers::types::Address) -> Result<u8> {
        Ok(Erc20::new(token, self.provider.clone()).decimals().call().await?)
    }

    /// `(sqrt_price_x96, tick, fee_pips)` from the flavor-specific state slot.
    async fn price_state(&self, pool: ethers::types::Address) -> Result<(ethers::types::U256, i32, u32)> {
        match self.flavor {
            PoolFlavor::Algebra => {
                let contract = AlgebraPool::new(pool, self.provider.clone());
                let (price, tick, fee, ..) = contract.global_state().call().await?;
                Ok((price, tick, u32::from(fee)))
            }
            PoolFlavor::Uniswap => {
                let contract = UniswapV3Pool::new(pool, self.provider.clone());
                let slot0 = contract.slot_0();
                let fee = contract.fee();
                let ((sqrt_price_x96, tick, ..), fee) = futures::try_join!(slot0.call(), fee.call())?;
                Ok((sqrt_price_x96, tick, fee))
            }
        }
    }
}

impl PoolDataSource for PoolClient {
    async fn snapshot(&self, pool: Address) -> Result<PoolSnapshot> {
        let pool_address = address_to_ethers(pool);
        let contract = ConcentratedPool::new(pool_address, self.provider.clone());
        let token0 = contract.token_0();
        let token1 = contract.token_1();
        let spacing = contract.tick_spacing();
        let liquidity = contract.liquidity();
        let (token0, token1, tick_spacing, liquidity) = futures::try_join!(
            token0.call(),
            token1.call(),
            spacing.call(),
            liquidity.call()
        )?;
        let ((sqrt_price_x96, tick, fee_pips), decimals0, decimals1) = futures::try_join!(
            self.price_state(pool_address),
            self.decimals(token0),
            self.decimals(token1)
        )?;

        let snapshot = PoolSnapshot {
            address: pool,
            token0: address_from_ethers(token0),
            token1: address_from_ethers(token1),
            decimals0,
            decimals1,
            sqrt_price_x96: u256_from_ethers(sqrt_price_x96),
            tick,
            tick_spacing,
            liquidity,
            fee_pips,
        };
        tracing::debug!(
            pool = %pool,
            flavor = %self.flavor,
            tick,
            tick_spacing,
            liquidity,
            fee_pips,
            "[DEX] snapshot fetched"
        );
        Ok(snapshot)
    }

    async fn liquidity_net(&self, pool: Address, tick: i32) -> Result<i128> {
        let pool_address = address_to_ethers(pool);
        let net = match self.flavor {
            PoolFlavor::Algebra => {
                AlgebraPool::new(pool_address, self.provider.clone())
                    .ticks(tick)
                    .call()
                    .await?
                    .1
            }
            PoolFlavor::Uniswap => {
                UniswapV3Pool::new(pool_address, self.provider.clone())
                    .ticks(tick)
                    .call()
                    .await?
                    .1
            }
        };
        Ok(net)
    }
}
