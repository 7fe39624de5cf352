//! Concentrated-liquidity pool math and on-chain access.

pub mod calc;
pub mod client;
pub mod price;
pub mod quote;
pub mod state;
pub mod tick;
pub mod walk;

pub use calc::{deltas_to_price, gross_up_for_fee};
pub use client::{PoolClient, PoolDataSource, PoolFlavor};
pub use quote::quote_swap;
pub use state::PoolSnapshot;
pub use walk::{LiquidityProvider, TickLiquidityMap, TickWalk, deltas_to_price_exact, walk_to_price};
