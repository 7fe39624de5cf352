use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Price outside the representable Q64.96 range, or a zero/negative input.
    #[error("Precision error: {0}")]
    Precision(String),

    /// Caller supplied probability/impact/spot outside the expected domain.
    #[error("Parameter out of range: {0}")]
    ParameterRange(String),

    /// Zero liquidity or zero sqrt price; only the affected side is skipped.
    #[error("Pool unavailable: {0}")]
    PoolUnavailable(String),

    /// Tick walk exceeded its crossing budget. Do not trade automatically.
    #[error("Tick walk did not converge after {crossings} boundary crossings")]
    NonConvergence { crossings: usize },

    #[error("Pool tokens do not match the expected asset/currency pair: {0}")]
    TokenMismatch(String),

    #[error("Inconsistent swap delta: amount0={amount0}, amount1={amount1}")]
    InconsistentDelta { amount0: String, amount1: String },

    #[error("Invalid liquidity at tick {tick}: {reason}")]
    InvalidLiquidity { tick: i32, reason: String },

    #[error("No liquidity data loaded for tick {0}")]
    MissingTickData(i32),

    #[error("Unknown proposal: {0}")]
    UnknownProposal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Contract error: {0}")]
    Contract(
        #[from]
        ethers::contract::ContractError<ethers::providers::Provider<ethers::providers::Http>>,
    ),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Math error: {0}")]
    Math(#[from] uniswap_v3_math::error::UniswapV3MathError),
}
