//! Exact tick-by-tick swap simulation across liquidity boundaries.
//!
//! The constant-liquidity formula in [`crate::dex::calc`] is wrong as soon as
//! the price leaves the current tick range. The walk here applies it one
//! segment at a time, updating `L` with each boundary's `liquidityNet`.

use std::collections::BTreeMap;

use alloy_primitives::U256;
use uniswap_v3_math::tick_math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};

use crate::dex::calc::segment_deltas;
use crate::dex::state::PoolSnapshot;
use crate::dex::tick::{check_spacing, next_boundary, sqrt_x96_at_tick};
use crate::errors::{AppError, Result};
use crate::models::SwapDelta;

/// Source of per-tick `liquidityNet` values for one pool.
pub trait LiquidityProvider {
    /// Net liquidity added when the price crosses `tick` upward. Zero for
    /// uninitialized ticks.
    fn liquidity_net(&self, tick: i32) -> Result<i128>;
}

/// Preloaded `liquidityNet` values. Asking for a tick that was never loaded
/// is an error, not an implicit zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickLiquidityMap {
    ticks: BTreeMap<i32, i128>,
}

impl TickLiquidityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tick: i32, liquidity_net: i128) {
        self.ticks.insert(tick, liquidity_net);
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

impl FromIterator<(i32, i128)> for TickLiquidityMap {
    fn from_iter<I: IntoIterator<Item = (i32, i128)>>(iter: I) -> Self {
        Self {
            ticks: iter.into_iter().collect(),
        }
    }
}

impl LiquidityProvider for TickLiquidityMap {
    fn liquidity_net(&self, tick: i32) -> Result<i128> {
        self.ticks
            .get(&tick)
            .copied()
            .ok_or(AppError::MissingTickData(tick))
    }
}

/// Outcome of an exact walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickWalk {
    pub delta: SwapDelta,
    /// Boundaries crossed, in travel order.
    pub crossed: Vec<i32>,
    /// In-range liquidity once the target is reached.
    pub end_liquidity: u128,
}

/// Apply a boundary's `liquidityNet` when crossing it in `upward` direction.
pub(crate) fn cross_boundary(liquidity: u128, net: i128, tick: i32, upward: bool) -> Result<u128> {
    let adds = (net >= 0) == upward;
    let next = if adds {
        liquidity.checked_add(net.unsigned_abs())
    } else {
        liquidity.checked_sub(net.unsigned_abs())
    };
    next.ok_or_else(|| AppError::InvalidLiquidity {
        tick,
        reason: format!("liquidity {liquidity} with net {net} leaves the uint128 range"),
    })
}

/// Clamps a boundary to the valid tick range.
pub(crate) fn clamp_tick(tick: i32) -> i32 {
    tick.clamp(MIN_TICK, MAX_TICK)
}

/// Deltas to reach `target_sqrt_price_x96`, crossing as many tick boundaries
/// as needed. Fails with [`AppError::NonConvergence`] when more than
/// `max_crossings` boundaries would have to be crossed.
pub fn deltas_to_price_exact(
    snapshot: &PoolSnapshot,
    target_sqrt_price_x96: U256,
    liquidity: &dyn LiquidityProvider,
    max_crossings: usize,
) -> Result<SwapDelta> {
    walk_to_price(snapshot, target_sqrt_price_x96, liquidity, max_crossings).map(|w| w.delta)
}

/// Same as [`deltas_to_price_exact`], keeping the crossing details.
pub fn walk_to_price(
    snapshot: &PoolSnapshot,
    target_sqrt_price_x96: U256,
    liquidity: &dyn LiquidityProvider,
    max_crossings: usize,
) -> Result<TickWalk> {
    snapshot.ensure_quotable()?;
    check_spacing(snapshot.tick_spacing)?;
    if target_sqrt_price_x96 < MIN_SQRT_RATIO || target_sqrt_price_x96 > MAX_SQRT_RATIO {
        return Err(AppError::Precision(format!(
            "target sqrt price {target_sqrt_price_x96} outside the tick range"
        )));
    }

    let upward = target_sqrt_price_x96 > snapshot.sqrt_price_x96;
    let mut current = snapshot.sqrt_price_x96;
    let mut tick = snapshot.tick;
    let mut l = snapshot.liquidity;
    let mut delta = SwapDelta::zero();
    let mut crossed = Vec::new();

    while current != target_sqrt_price_x96 {
        let boundary = clamp_tick(next_boundary(tick, snapshot.tick_spacing, upward));
        let boundary_sqrt = sqrt_x96_at_tick(boundary)?;
        let step_target = if upward {
            target_sqrt_price_x96.min(boundary_sqrt)
        } else {
            target_sqrt_price_x96.max(boundary_sqrt)
        };

        delta += &segment_deltas(current, step_target, l)?;
        current = step_target;
        if current == target_sqrt_price_x96 {
            break;
        }

        if crossed.len() >= max_crossings {
            tracing::warn!(
                pool = %snapshot.address,
                crossings = crossed.len(),
                "[WALK] crossing budget exhausted before reaching target"
            );
            return Err(AppError::NonConvergence {
                crossings: crossed.len(),
            });
        }
        let net = liquidity.liquidity_net(boundary)?;
        l = cross_boundary(l, net, boundary, upward)?;
        tick = if upward { boundary } else { boundary - 1 };
        crossed.push(boundary);
        tracing::trace!(boundary, net, liquidity = l, "[WALK] crossed boundary");
    }

    tracing::debug!(
        pool = %snapshot.address,
        crossings = crossed.len(),
        amount0 = %delta.amount0,
        amount1 = %delta.amount1,
        "[WALK] reached target"
    );
    Ok(TickWalk {
        delta,
        crossed,
        end_liquidity: l,
    })
}
