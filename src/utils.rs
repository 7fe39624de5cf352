//! Miscellaneous helper utilities.

use alloy_primitives::{Address, U256};
use num_bigint::{BigInt, Sign};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

pub fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

/// `None` for negative values or values wider than 256 bits.
pub fn bigint_to_u256(value: &BigInt) -> Option<U256> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return None;
    }
    U256::try_from_be_slice(&bytes)
}

/// Converts an ethers `U256` (little-endian limbs) into an alloy `U256`.
pub fn u256_from_ethers(value: ethers::types::U256) -> U256 {
    U256::from_limbs(value.0)
}

pub fn address_to_ethers(address: Address) -> ethers::types::Address {
    ethers::types::Address::from(address.0.0)
}

pub fn address_from_ethers(address: ethers::types::Address) -> Address {
    Address::from(address.0)
}
