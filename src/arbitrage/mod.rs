pub mod direction;
pub mod planner;
pub mod target;
pub mod types;

pub use planner::ArbitragePlanner;
pub use types::{ArbitragePlan, ConditionalPools, PlannerConfig, SidePool};
