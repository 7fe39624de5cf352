//! Proposal-level entry points: fetch pool state, then plan or quote.

use alloy_primitives::{Address, U256};
use futures::{StreamExt, TryStreamExt, stream};
use uniswap_v3_math::tick_math::{MAX_TICK, MIN_TICK};

use crate::arbitrage::direction::is_inverted;
use crate::arbitrage::{ArbitragePlan, ArbitragePlanner, SidePool};
use crate::config::{ProposalRegistry, SidePoolConfig};
use crate::dex::client::PoolDataSource;
use crate::dex::quote;
use crate::dex::tick::next_boundary;
use crate::dex::walk::TickLiquidityMap;
use crate::errors::{AppError, Result};
use crate::models::{OutcomeSide, SwapQuote, TradeParameters, TradePlan};

/// Concurrent `liquidityNet` reads per pool.
const TICK_FETCH_CONCURRENCY: usize = 16;
/// Boundaries loaded per round while quoting.
const QUOTE_TICK_BATCH: usize = 32;

pub struct ArbitrageService<D> {
    source: D,
    registry: ProposalRegistry,
    planner: ArbitragePlanner,
}

impl<D: PoolDataSource> ArbitrageService<D> {
    pub fn new(source: D, registry: ProposalRegistry, planner: ArbitragePlanner) -> Self {
        Self {
            source,
            registry,
            planner,
        }
    }

    /// Plan the YES and NO trades for `proposal_id`. Unknown proposals and
    /// invalid parameters fail the call; everything else is reported per side.
    pub async fn plan_arbitrage(&self, proposal_id: &str, params: &TradeParameters) -> Result<ArbitragePlan> {
        let proposal = self.registry.get(proposal_id)?;
        self.planner.validate(params)?;
        let (yes, no) = futures::join!(
            self.plan_side(OutcomeSide::Yes, &proposal.yes, params),
            self.plan_side(OutcomeSide::No, &proposal.no, params)
        );
        for (side, result) in [(OutcomeSide::Yes, &yes), (OutcomeSide::No, &no)] {
            match result {
                Ok(plan) => tracing::info!(proposal = proposal_id, %side, %plan, "[PLAN] side ready"),
                Err(e) => tracing::warn!(proposal = proposal_id, %side, error = %e, "[PLAN] side skipped"),
            }
        }
        Ok(ArbitragePlan { yes, no })
    }

    async fn plan_side(&self, side: OutcomeSide, pool: &SidePoolConfig, params: &TradeParameters) -> Result<TradePlan> {
        let snapshot = self.source.snapshot(pool.pool).await?;
        snapshot.ensure_quotable()?;
        let roles = pool.roles();
        let target = self.planner.target_for(side, &snapshot, &roles, params)?;
        let boundaries = self
            .planner
            .required_boundaries(&snapshot, target.sqrt_price_x96)?;
        let max = self.planner.config().max_tick_crossings;
        if boundaries.len() > max {
            return Err(AppError::NonConvergence { crossings: max });
        }
        let mut liquidity = TickLiquidityMap::new();
        self.load_ticks(pool.pool, &boundaries, &mut liquidity).await?;
        tracing::debug!(%side, pool = %pool.pool, ticks = liquidity.len(), "[PLAN] tick liquidity loaded");

        self.planner.plan_side(
            side,
            &SidePool {
                snapshot: &snapshot,
                roles,
                liquidity: &liquidity,
            },
            params,
        )
    }

    /// Exact-input quote against one side of `proposal_id`, fee included.
    /// Tick liquidity is loaded in batches as the simulated swap reaches it.
    pub async fn quote_swap(
        &self,
        proposal_id: &str,
        side: OutcomeSide,
        input_is_asset: bool,
        amount_in: U256,
    ) -> Result<SwapQuote> {
        let pool = self.registry.get(proposal_id)?.side(side);
        let snapshot = self.source.snapshot(pool.pool).await?;
        snapshot.ensure_quotable()?;
        let roles = pool.roles();
        // Token1 in pushes the price up.
        let upward = input_is_asset == is_inverted(&snapshot, &roles)?;
        let max = self.planner.config().max_tick_crossings;

        let mut liquidity = TickLiquidityMap::new();
        let mut cursor = snapshot.tick;
        loop {
            match quote::quote_swap(&snapshot, &roles, input_is_asset, amount_in, &liquidity, max) {
                Err(AppError::MissingTickData(tick)) => {
                    if liquidity.len() >= max {
                        return Err(AppError::NonConvergence { crossings: liquidity.len() });
                    }
                    let batch = boundaries_from(cursor, snapshot.tick_spacing, upward, QUOTE_TICK_BATCH);
                    let Some(&last) = batch.last() else {
                        return Err(AppError::MissingTickData(tick));
                    };
                    cursor = if upward { last } else { last - 1 };
                    self.load_ticks(pool.pool, &batch, &mut liquidity).await?;
                }
                Ok(quote) => {
                    tracing::info!(
                        proposal = proposal_id,
                        %side,
                        amount_in = %quote.amount_in,
                        amount_out = %quote.amount_out,
                        fee = %quote.fee_amount,
                        crossings = quote.boundaries_crossed,
                        "[QUOTE] swap quoted"
                    );
                    return Ok(quote);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn load_ticks(&self, pool: Address, ticks: &[i32], into: &mut TickLiquidityMap) -> Result<()> {
        let fetched: Vec<(i32, i128)> = stream::iter(ticks.iter().copied())
            .map(|tick| async move { Ok::<_, AppError>((tick, self.source.liquidity_net(pool, tick).await?)) })
            .buffered(TICK_FETCH_CONCURRENCY)
            .try_collect()
            .await?;
        for (tick, net) in fetched {
            into.insert(tick, net);
        }
        Ok(())
    }
}

/// Up to `count` consecutive boundaries a swap leaving `tick` meets, stopping
/// at the tick range limits.
fn boundaries_from(tick: i32, tick_spacing: i32, upward: bool, count: usize) -> Vec<i32> {
    let mut out = Vec::with_capacity(count);
    let mut tick = tick;
    while out.len() < count {
        let boundary = next_boundary(tick, tick_spacing, upward);
        if !(MIN_TICK..=MAX_TICK).contains(&boundary) {
            break;
        }
        out.push(boundary);
        tick = if upward { boundary } else { boundary - 1 };
    }
    out
}
