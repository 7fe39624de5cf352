//! Command-line interface of the `futarchy-arb` binary.

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand, ValueEnum};

use crate::models::OutcomeSide;

#[derive(Debug, Parser)]
#[command(name = "futarchy-arb")]
#[command(about = "Plan trades that move futarchy YES/NO pools to their target prices", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Plan the YES and NO trades that reach the futarchy targets
    #[command(allow_negative_numbers = true)]
    Plan {
        /// Proposal id from the proposals file
        proposal_id: String,
        /// Fair spot price, currency per asset
        spot_price: BigDecimal,
        /// Probability the proposal passes, in [0, 1]
        probability: BigDecimal,
        /// Fractional price impact if it passes (0.05 = +5%)
        impact: BigDecimal,
    },
    /// Quote an exact-input swap on one side
    Quote {
        /// Proposal id from the proposals file
        proposal_id: String,
        /// Outcome pool to quote against (yes or no)
        side: OutcomeSide,
        /// Token being sold into the pool
        #[arg(value_enum)]
        input: InputToken,
        /// Raw input amount, fee included
        amount_in: U256,
    },
}

/// Which of the pool's tokens is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputToken {
    Asset,
    Currency,
}

impl InputToken {
    pub fn is_asset(self) -> bool {
        self == InputToken::Asset
    }
}
