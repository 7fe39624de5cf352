//! Futarchy target prices for the conditional YES/NO pools.
//!
//! After resolution the YES pool should trade at the spot price moved by the
//! impact of the event, scaled by the remaining uncertainty `1 - p`; the NO
//! pool carries the complementary mass `p` in the opposite direction.

use bigdecimal::BigDecimal;
use num_traits::{One, Signed, Zero};

use crate::errors::{AppError, Result};
use crate::models::{OutcomeSide, TradeParameters};

/// `spot * (1 + impact * (1 - probability))`
pub fn yes_target_price(spot: &BigDecimal, probability: &BigDecimal, impact: &BigDecimal) -> BigDecimal {
    spot * (BigDecimal::one() + impact * (BigDecimal::one() - probability))
}

/// `spot * (1 - impact * probability)`
pub fn no_target_price(spot: &BigDecimal, probability: &BigDecimal, impact: &BigDecimal) -> BigDecimal {
    spot * (BigDecimal::one() - impact * probability)
}

pub fn target_price(side: OutcomeSide, params: &TradeParameters) -> BigDecimal {
    match side {
        OutcomeSide::Yes => yes_target_price(&params.spot_price, &params.probability, &params.impact),
        OutcomeSide::No => no_target_price(&params.spot_price, &params.probability, &params.impact),
    }
}

/// Rejects parameters outside their domain. `|impact| > 1` is almost always
/// a percentage passed as a fraction; it is refused unless
/// `allow_extreme_impact` is set, and never clamped.
pub fn validate(params: &TradeParameters, allow_extreme_impact: bool) -> Result<()> {
    if !params.spot_price.is_positive() {
        return Err(AppError::ParameterRange(format!(
            "spot price must be positive, got {}",
            params.spot_price
        )));
    }
    if params.probability < BigDecimal::zero() || params.probability > BigDecimal::one() {
        return Err(AppError::ParameterRange(format!(
            "probability must be within [0, 1], got {}",
            params.probability
        )));
    }
    if params.impact.abs() > BigDecimal::one() {
        tracing::warn!(
            impact = %params.impact,
            allowed = allow_extreme_impact,
            "[TARGET] |impact| > 1, likely a caller error"
        );
        if !allow_extreme_impact {
            return Err(AppError::ParameterRange(format!(
                "impact {} exceeds 100%; pass a fraction",
                params.impact
            )));
        }
    }
    Ok(())
}
