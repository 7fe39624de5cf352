use alloy_primitives::U256;

use super::direction::{is_inverted, pool_price, resolve};
use super::target::{target_price, validate};
use super::types::{ArbitragePlan, ConditionalPools, PlannerConfig, SidePool};
use crate::dex::calc::deltas_to_price;
use crate::dex::price::sqrt_x96_from_price;
use crate::dex::state::PoolSnapshot;
use crate::dex::tick::{boundaries_crossed, sqrt_x96_at_tick, tick_from_sqrt_x96};
use crate::dex::walk::walk_to_price;
use crate::errors::Result;
use crate::models::{OutcomeSide, QuoteMethod, TargetPrice, TokenRoles, TradeParameters, TradePlan};

/// Computes the trades that move a proposal's YES and NO pools to their
/// futarchy target prices. Pure: no I/O, no shared state.
#[derive(Debug, Clone, Default)]
pub struct ArbitragePlanner {
    config: PlannerConfig,
}

impl ArbitragePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn validate(&self, params: &TradeParameters) -> Result<()> {
        validate(params, self.config.allow_extreme_impact)
    }

    /// Plan both sides. Invalid parameters reject the whole call; any other
    /// failure is confined to its side.
    pub fn plan(&self, pools: &ConditionalPools<'_>, params: &TradeParameters) -> Result<ArbitragePlan> {
        self.validate(params)?;
        Ok(ArbitragePlan {
            yes: self.plan_side(OutcomeSide::Yes, &pools.yes, params),
            no: self.plan_side(OutcomeSide::No, &pools.no, params),
        })
    }

    /// Target price for `side`, expressed both as currency per asset and as
    /// the pool's own Q64.96 sqrt price.
    pub fn target_for(
        &self,
        side: OutcomeSide,
        snapshot: &PoolSnapshot,
        roles: &TokenRoles,
        params: &TradeParameters,
    ) -> Result<TargetPrice> {
        let price = target_price(side, params);
        let inverted = is_inverted(snapshot, roles)?;
        let sqrt_price_x96 = sqrt_x96_from_price(
            &pool_price(&price, inverted)?,
            snapshot.decimals0,
            snapshot.decimals1,
        )?;
        Ok(TargetPrice {
            side,
            price,
            sqrt_price_x96,
        })
    }

    /// Tick boundaries a move to `target_sqrt_price_x96` crosses, i.e. the
    /// `liquidityNet` values the exact walk will ask for.
    pub fn required_boundaries(&self, snapshot: &PoolSnapshot, target_sqrt_price_x96: U256) -> Result<Vec<i32>> {
        let end_tick = tick_from_sqrt_x96(target_sqrt_price_x96)?;
        let mut boundaries = boundaries_crossed(snapshot.tick, end_tick, snapshot.tick_spacing)?;
        // A target sitting exactly on the last boundary is reached without crossing it.
        if end_tick > snapshot.tick
            && boundaries.last() == Some(&end_tick)
            && sqrt_x96_at_tick(end_tick)? == target_sqrt_price_x96
        {
            boundaries.pop();
        }
        Ok(boundaries)
    }

    /// Plan one side. Parameters are assumed validated.
    pub fn plan_side(
        &self,
        side: OutcomeSide,
        pool: &SidePool<'_>,
        params: &TradeParameters,
    ) -> Result<TradePlan> {
        let snapshot = pool.snapshot;
        snapshot.ensure_quotable()?;
        let target = self.target_for(side, snapshot, &pool.roles, params)?;
        let crossings = self.required_boundaries(snapshot, target.sqrt_price_x96)?;
        let estimate = deltas_to_price(snapshot, target.sqrt_price_x96)?;

        let (delta, method, crossed) = if crossings.is_empty() {
            (estimate, QuoteMethod::SingleRange, 0)
        } else {
            let walk = walk_to_price(
                snapshot,
                target.sqrt_price_x96,
                pool.liquidity,
                self.config.max_tick_crossings,
            )?;
            // Flat crossings only differ from the estimate by per-segment rounding.
            if walk.end_liquidity != snapshot.liquidity && walk.delta != estimate {
                tracing::warn!(
                    %side,
                    estimate_amount0 = %estimate.amount0,
                    estimate_amount1 = %estimate.amount1,
                    exact_amount0 = %walk.delta.amount0,
                    exact_amount1 = %walk.delta.amount1,
                    "[PLAN] single-range estimate differs from tick walk"
                );
            }
            (walk.delta, QuoteMethod::MultiTick, walk.crossed.len())
        };

        let mut plan = resolve(snapshot, &delta, &pool.roles, target.sqrt_price_x96)?;
        plan.method = method;
        plan.boundaries_crossed = crossed;
        tracing::debug!(
            %side,
            pool = %snapshot.address,
            target = %target.price,
            direction = ?plan.direction,
            method = ?plan.method,
            crossings = plan.boundaries_crossed,
            "[PLAN] side planned"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::price::invert_price;
    use crate::dex::state::fixtures::{ASSET, CURRENCY, unit_pool};
    use crate::dex::walk::TickLiquidityMap;
    use crate::errors::AppError;
    use crate::models::TradeDirection;
    use alloy_primitives::Address;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    const L: u128 = 1_000_000_000_000_000_000_000_000;
    const ROLES: TokenRoles = TokenRoles {
        asset: ASSET,
        currency: CURRENCY,
    };

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn reference_params() -> TradeParameters {
        TradeParameters::new(dec("107.73"), dec("0.6154"), dec("0.0744"))
    }

    /// Pool quoting `price` currency per asset.
    fn pool_at(price: &str, liquidity: u128, spacing: i32, inverted: bool) -> PoolSnapshot {
        let display = dec(price);
        let raw = if inverted {
            invert_price(&display).unwrap()
        } else {
            display
        };
        let sqrt_price_x96 = sqrt_x96_from_price(&raw, 18, 18).unwrap();
        let (token0, token1) = if inverted { (CURRENCY, ASSET) } else { (ASSET, CURRENCY) };
        PoolSnapshot {
            address: Address::repeat_byte(if inverted { 0x02 } else { 0x01 }),
            token0,
            token1,
            decimals0: 18,
            decimals1: 18,
            sqrt_price_x96,
            tick: tick_from_sqrt_x96(sqrt_price_x96).unwrap(),
            tick_spacing: spacing,
            liquidity,
            fee_pips: 0,
        }
    }

    /// Zero `liquidityNet` on every multiple of 60 around tick 46 500 (price ~105).
    fn flat_map() -> TickLiquidityMap {
        (600..900).map(|k| (k * 60, 0i128)).collect()
    }

    fn close(a: &BigDecimal, b: &BigDecimal, tolerance: &str) -> bool {
        (a - b).abs() < dec(tolerance)
    }

    #[test]
    fn plans_both_sides_toward_their_targets() {
        let yes = pool_at("105", L, 2000, false);
        let no = pool_at("105", L, 2000, false);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let plan = ArbitragePlanner::default().plan(&pools, &reference_params()).unwrap();

        let yes_plan = plan.yes.unwrap();
        assert_eq!(yes_plan.direction, TradeDirection::BuyAsset);
        assert_eq!(yes_plan.method, QuoteMethod::SingleRange);
        assert!(close(&yes_plan.end_price, &dec("110.8126"), "0.0001"));

        let no_plan = plan.no.unwrap();
        assert_eq!(no_plan.direction, TradeDirection::SellAsset);
        assert_eq!(no_plan.sell_token, ASSET);
        assert!(close(&no_plan.end_price, &dec("102.80"), "0.005"));
    }

    #[test]
    fn inverted_pool_reports_currency_per_asset() {
        let yes = pool_at("105", L, 2000, true);
        let no = pool_at("105", L, 2000, false);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let plan = ArbitragePlanner::default().plan(&pools, &reference_params()).unwrap();
        let yes_plan = plan.yes.unwrap();
        assert!(yes_plan.is_inverted);
        assert_eq!(yes_plan.direction, TradeDirection::BuyAsset);
        assert_eq!(yes_plan.sell_token, CURRENCY);
        assert!(close(&yes_plan.start_price, &dec("105"), "1e-9"));
        assert!(close(&yes_plan.end_price, &dec("110.8126"), "0.0001"));
    }

    #[test]
    fn pool_at_target_yields_noop() {
        let yes = pool_at("100", L, 60, false);
        let no = pool_at("100", L, 60, true);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let params = TradeParameters::new(dec("100"), dec("0.5"), dec("0"));
        let plan = ArbitragePlanner::default().plan(&pools, &params).unwrap();
        assert!(plan.yes.unwrap().is_noop());
        assert!(plan.no.unwrap().is_noop());
    }

    #[test]
    fn zero_liquidity_only_skips_that_side() {
        let yes = pool_at("105", L, 2000, false);
        let no = pool_at("105", 0, 2000, false);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let plan = ArbitragePlanner::default().plan(&pools, &reference_params()).unwrap();
        assert!(plan.yes.is_ok());
        assert!(matches!(plan.no, Err(AppError::PoolUnavailable(_))));
    }

    #[test]
    fn crossings_switch_to_the_exact_walk() {
        // Half the liquidity ends at tick 46 560, just above the YES pool price.
        let yes = pool_at("105", L, 60, false);
        let no = pool_at("105", L, 2000, false);
        assert_eq!(yes.tick / 60 * 60 + 60, 46_560);
        let mut map = flat_map();
        map.insert(46_560, -((L / 2) as i128));
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let planner = ArbitragePlanner::default();
        let params = reference_params();
        let plan = planner.plan(&pools, &params).unwrap();
        let yes_plan = plan.yes.unwrap();
        assert_eq!(yes_plan.method, QuoteMethod::MultiTick);
        let target = planner.target_for(OutcomeSide::Yes, &yes, &ROLES, &params).unwrap();
        let walk = walk_to_price(&yes, target.sqrt_price_x96, &map, 64).unwrap();
        assert_eq!(yes_plan.boundaries_crossed, walk.crossed.len());
        assert_eq!(yes_plan.boundaries_crossed, 9);

        let estimate = deltas_to_price(&yes, target.sqrt_price_x96).unwrap();
        let single_range = resolve(&yes, &estimate, &ROLES, target.sqrt_price_x96).unwrap();
        assert!(yes_plan.sell_amount < single_range.sell_amount);
        assert_eq!(plan.no.unwrap().method, QuoteMethod::SingleRange);
    }

    #[test]
    fn target_on_a_boundary_needs_no_crossing() {
        let pool = unit_pool(L, 60);
        let planner = ArbitragePlanner::default();
        let on_boundary = sqrt_x96_at_tick(60).unwrap();
        assert!(planner.required_boundaries(&pool, on_boundary).unwrap().is_empty());
        assert_eq!(
            planner.required_boundaries(&pool, on_boundary + U256::from(1u8)).unwrap(),
            vec![60]
        );
        let walk = walk_to_price(&pool, on_boundary, &TickLiquidityMap::new(), 8).unwrap();
        assert!(walk.crossed.is_empty());
        assert_eq!(walk.delta, deltas_to_price(&pool, on_boundary).unwrap());
        // Moving down from a tick that sits on a boundary crosses it at once.
        assert_eq!(
            planner.required_boundaries(&pool, sqrt_x96_at_tick(-1).unwrap()).unwrap(),
            vec![0]
        );
    }

    #[test]
    fn non_convergence_is_fatal_to_its_side_only() {
        let yes = pool_at("105", L, 60, false);
        let no = pool_at("105", L, 2000, false);
        let map = flat_map();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let planner = ArbitragePlanner::new(PlannerConfig {
            max_tick_crossings: 2,
            allow_extreme_impact: false,
        });
        let plan = planner.plan(&pools, &reference_params()).unwrap();
        assert!(matches!(plan.yes, Err(AppError::NonConvergence { .. })));
        assert!(plan.no.is_ok());
    }

    #[test]
    fn bad_parameters_reject_the_whole_call() {
        let yes = pool_at("105", L, 2000, false);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
        };
        let params = TradeParameters::new(dec("107.73"), dec("1.5"), dec("0.07"));
        assert!(matches!(
            ArbitragePlanner::default().plan(&pools, &params),
            Err(AppError::ParameterRange(_))
        ));
    }

    #[test]
    fn negative_no_target_is_a_side_precision_error() {
        // impact * p > 1 drives the NO target below zero.
        let yes = pool_at("105", L, 2000, false);
        let no = pool_at("105", L, 2000, false);
        let map = TickLiquidityMap::new();
        let pools = ConditionalPools {
            yes: SidePool { snapshot: &yes, roles: ROLES, liquidity: &map },
            no: SidePool { snapshot: &no, roles: ROLES, liquidity: &map },
        };
        let planner = ArbitragePlanner::new(PlannerConfig {
            allow_extreme_impact: true,
            ..PlannerConfig::default()
        });
        let params = TradeParameters::new(dec("100"), dec("0.9"), dec("1.5"));
        let plan = planner.plan(&pools, &params).unwrap();
        assert!(matches!(plan.no, Err(AppError::Precision(_))));
    }
}
