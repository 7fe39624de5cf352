use crate::dex::{LiquidityProvider, PoolSnapshot};
use crate::errors::Result;
use crate::models::{OutcomeSide, TokenRoles, TradePlan};

/// Crossing budget used when none is configured.
pub const DEFAULT_MAX_TICK_CROSSINGS: usize = 2048;

/// Configuration for arbitrage planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Tick boundaries the exact walk may cross before giving up.
    pub max_tick_crossings: usize,
    /// Accept `|impact| > 1` (still logged as a warning).
    pub allow_extreme_impact: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_tick_crossings: DEFAULT_MAX_TICK_CROSSINGS,
            allow_extreme_impact: false,
        }
    }
}

/// One conditional pool together with everything needed to plan on it.
#[derive(Clone, Copy)]
pub struct SidePool<'a> {
    pub snapshot: &'a PoolSnapshot,
    pub roles: TokenRoles,
    pub liquidity: &'a dyn LiquidityProvider,
}

/// The YES and NO pools of one proposal.
#[derive(Clone, Copy)]
pub struct ConditionalPools<'a> {
    pub yes: SidePool<'a>,
    pub no: SidePool<'a>,
}

/// Per-side results. One side failing never hides the other.
#[derive(Debug)]
pub struct ArbitragePlan {
    pub yes: Result<TradePlan>,
    pub no: Result<TradePlan>,
}

impl ArbitragePlan {
    pub fn side(&self, side: OutcomeSide) -> &Result<TradePlan> {
        match side {
            OutcomeSide::Yes => &self.yes,
            OutcomeSide::No => &self.no,
        }
    }
}
