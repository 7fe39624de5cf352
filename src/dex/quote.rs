//! Exact-input single-swap quotes, fee included.

use alloy_primitives::{I256, U256};
use uniswap_v3_math::swap_math::compute_swap_step;
use uniswap_v3_math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};

use crate::arbitrage::direction::{display_price, is_inverted};
use crate::dex::state::PoolSnapshot;
use crate::dex::tick::{check_spacing, next_boundary, sqrt_x96_at_tick};
use crate::dex::walk::{LiquidityProvider, clamp_tick, cross_boundary};
use crate::errors::{AppError, Result};
use crate::models::{SwapQuote, TokenRoles};

/// Quote swapping `amount_in` raw units of the asset (or currency) into the
/// pool, walking across tick boundaries and charging `snapshot.fee_pips`.
pub fn quote_swap(
    snapshot: &PoolSnapshot,
    roles: &TokenRoles,
    input_is_asset: bool,
    amount_in: U256,
    liquidity: &dyn LiquidityProvider,
    max_crossings: usize,
) -> Result<SwapQuote> {
    snapshot.ensure_quotable()?;
    check_spacing(snapshot.tick_spacing)?;
    let inverted = is_inverted(snapshot, roles)?;
    let start_price = display_price(snapshot, snapshot.sqrt_price_x96, inverted)?;

    // token0 in pushes the price down.
    let zero_for_one = input_is_asset != inverted;
    let upward = !zero_for_one;
    let limit = if zero_for_one {
        MIN_SQRT_RATIO + U256::from(1u8)
    } else {
        MAX_SQRT_RATIO - U256::from(1u8)
    };

    let mut current = snapshot.sqrt_price_x96;
    let mut tick = snapshot.tick;
    let mut l = snapshot.liquidity;
    let mut remaining = amount_in;
    let mut amount_out = U256::ZERO;
    let mut fee_amount = U256::ZERO;
    let mut crossed = 0usize;

    while !remaining.is_zero() && current != limit {
        let boundary = clamp_tick(next_boundary(tick, snapshot.tick_spacing, upward));
        let boundary_sqrt = sqrt_x96_at_tick(boundary)?;
        let step_target = if zero_for_one {
            boundary_sqrt.max(limit)
        } else {
            boundary_sqrt.min(limit)
        };

        let amount_remaining = I256::try_from(remaining)
            .map_err(|_| AppError::Precision(format!("amount {remaining} exceeds int256")))?;
        let (next, step_in, step_out, step_fee) =
            compute_swap_step(current, step_target, l, amount_remaining, snapshot.fee_pips)?;

        remaining = remaining.saturating_sub(step_in + step_fee);
        amount_out += step_out;
        fee_amount += step_fee;
        current = next;

        if current != boundary_sqrt {
            break;
        }
        if crossed >= max_crossings {
            return Err(AppError::NonConvergence { crossings: crossed });
        }
        let net = liquidity.liquidity_net(boundary)?;
        l = cross_boundary(l, net, boundary, upward)?;
        tick = if upward { boundary } else { boundary - 1 };
        crossed += 1;
    }

    let end_price = display_price(snapshot, current, inverted)?;
    let consumed = amount_in - remaining;
    if !remaining.is_zero() {
        tracing::warn!(
            pool = %snapshot.address,
            unfilled = %remaining,
            "[QUOTE] price limit reached before the input was consumed"
        );
    }
    tracing::debug!(
        pool = %snapshot.address,
        amount_in = %consumed,
        amount_out = %amount_out,
        crossed,
        "[QUOTE] swap quoted"
    );

    Ok(SwapQuote {
        amount_in: consumed,
        amount_out,
        fee_amount,
        start_price,
        end_price,
        boundaries_crossed: crossed,
    })
}
