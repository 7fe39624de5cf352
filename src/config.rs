//! Configuration loader and application settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::Deserialize;

use crate::arbitrage::types::{DEFAULT_MAX_TICK_CROSSINGS, PlannerConfig};
use crate::dex::client::PoolFlavor;
use crate::errors::{AppError, Result};
use crate::models::{OutcomeSide, TokenRoles};

const DEFAULT_PROPOSALS_FILE: &str = "proposals.json";

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// RPC endpoint for the chain hosting the conditional pools.
    pub rpc_url: String,
    /// JSON file listing proposals and their YES/NO pools.
    pub proposals_file: PathBuf,
    pub pool_flavor: PoolFlavor,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let rpc_url = lookup("RPC_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("set RPC_URL to your node's HTTP endpoint".into()))?;
        let proposals_file = lookup("PROPOSALS_FILE")
            .unwrap_or_else(|| DEFAULT_PROPOSALS_FILE.into())
            .into();
        let pool_flavor = match lookup("POOL_FLAVOR") {
            Some(raw) => raw.parse()?,
            None => PoolFlavor::default(),
        };
        let max_tick_crossings = match lookup("MAX_TICK_CROSSINGS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                AppError::Config(format!("MAX_TICK_CROSSINGS must be a non-negative integer: {e}"))
            })?,
            None => DEFAULT_MAX_TICK_CROSSINGS,
        };
        let allow_extreme_impact = match lookup("ALLOW_EXTREME_IMPACT") {
            Some(raw) => parse_flag(&raw)?,
            None => false,
        };
        Ok(Self {
            rpc_url,
            proposals_file,
            pool_flavor,
            planner: PlannerConfig {
                max_tick_crossings,
                allow_extreme_impact,
            },
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!("ALLOW_EXTREME_IMPACT: invalid flag '{other}'"))),
    }
}

/// One conditional pool and the roles of its two tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SidePoolConfig {
    pub pool: Address,
    /// Conditional outcome token being priced.
    pub asset: Address,
    /// Conditional collateral token the price is quoted in.
    pub currency: Address,
}

impl SidePoolConfig {
    pub fn roles(&self) -> TokenRoles {
        TokenRoles {
            asset: self.asset,
            currency: self.currency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProposalConfig {
    pub id: String,
    pub yes: SidePoolConfig,
    pub no: SidePoolConfig,
}

impl ProposalConfig {
    pub fn side(&self, side: OutcomeSide) -> &SidePoolConfig {
        match side {
            OutcomeSide::Yes => &self.yes,
            OutcomeSide::No => &self.no,
        }
    }
}

/// Proposals by id.
#[derive(Debug, Clone, Default)]
pub struct ProposalRegistry {
    proposals: HashMap<String, ProposalConfig>,
}

impl ProposalRegistry {
    pub fn new(proposals: Vec<ProposalConfig>) -> Result<Self> {
        let mut map = HashMap::with_capacity(proposals.len());
        for proposal in proposals {
            if proposal.yes.pool == proposal.no.pool {
                return Err(AppError::Config(format!(
                    "proposal {} uses pool {} for both sides",
                    proposal.id, proposal.yes.pool
                )));
            }
            if let Some(previous) = map.insert(proposal.id.clone(), proposal) {
                return Err(AppError::Config(format!("duplicate proposal id {}", previous.id)));
            }
        }
        Ok(Self { proposals: map })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Self::new(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let registry = Self::from_json(&raw)?;
        tracing::info!(path = %path.display(), proposals = registry.len(), "[INIT] proposals loaded");
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Result<&ProposalConfig> {
        self.proposals
            .get(id)
            .ok_or_else(|| AppError::UnknownProposal(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
