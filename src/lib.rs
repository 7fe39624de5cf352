//! Futarchy conditional-pool arbitrage planning.
//!
//! Computes, for a proposal's YES and NO concentrated-liquidity pools, the
//! swaps that move each pool to its futarchy-implied target price.

pub mod arbitrage;
pub mod cli;
pub mod config;
pub mod dex;
pub mod errors;
pub mod models;
pub mod service;
pub mod utils;
