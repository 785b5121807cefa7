//! Slippage bounds
//!
//! Turns a simulated route and a tolerance into the amount to transfer and
//! the per-hop limits encoded into the aggregated swap.

use num_bigint::BigUint;
use num_traits::One;
use router_core::{Result, RouterError};
use rust_decimal::Decimal;

use crate::calculator::decimal_ratio;
use crate::state::SwapType;

/// Amount to transfer plus one limit per hop.
///
/// For fixed-input hops the limit is the minimum accepted output; for
/// fixed-output hops it is the exact output requested from that pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapBounds {
    pub amount_in: BigUint,
    pub hop_limits: Vec<BigUint>,
}

pub fn validate_tolerance(tolerance: Decimal) -> Result<()> {
    if tolerance.is_sign_negative() || tolerance >= Decimal::ONE {
        return Err(RouterError::invalid_amount(format!(
            "tolerance {} must be in [0, 1)",
            tolerance
        )));
    }
    Ok(())
}

fn tolerance_ratio(tolerance: Decimal) -> Result<(BigUint, BigUint)> {
    validate_tolerance(tolerance)?;
    decimal_ratio(tolerance).ok_or_else(|| {
        RouterError::invalid_amount(format!("tolerance {} must be in [0, 1)", tolerance))
    })
}

/// floor(amount * (1 + tolerance))
pub fn max_amount_in(amount: &BigUint, tolerance: Decimal) -> Result<BigUint> {
    let (num, denom) = tolerance_ratio(tolerance)?;
    Ok(amount * (&denom + num) / denom)
}

/// floor(amount * (1 - tolerance))
pub fn min_amount_out(amount: &BigUint, tolerance: Decimal) -> Result<BigUint> {
    let (num, denom) = tolerance_ratio(tolerance)?;
    Ok(amount * (&denom - num) / denom)
}

/// Compute transfer amount and per-hop limits.
///
/// Fixed input: transfer exactly the simulated input, accept anything on
/// intermediate hops (limit 1) and protect only the final output.
///
/// Fixed output: transfer the input plus the full tolerance, and spread that
/// margin over the hops so hop `i` of `H` asks for
/// `amount[i + 1] * (1 + tolerance * (H - i - 1) / H)`. The last hop asks for
/// exactly the requested output.
pub fn compute_swap_bounds(
    swap_type: SwapType,
    intermediary_amounts: &[BigUint],
    tolerance: Decimal,
) -> Result<SwapBounds> {
    if intermediary_amounts.len() < 2 {
        return Err(RouterError::invalid_route(
            "a route needs at least two intermediary amounts",
        ));
    }
    let hops = intermediary_amounts.len() - 1;
    let first = &intermediary_amounts[0];

    match swap_type {
        SwapType::FixedInput => {
            let mut hop_limits = vec![BigUint::one(); hops];
            // A zero limit would encode as an empty argument and accept any output
            hop_limits[hops - 1] =
                min_amount_out(&intermediary_amounts[hops], tolerance)?.max(BigUint::one());
            Ok(SwapBounds {
                amount_in: first.clone(),
                hop_limits,
            })
        }
        SwapType::FixedOutput => {
            let (tol_num, tol_denom) = tolerance_ratio(tolerance)?;
            let h = BigUint::from(hops);
            let scale = &h * &tol_denom;
            let hop_limits = (0..hops)
                .map(|i| {
                    let remaining = BigUint::from(hops - i - 1);
                    let factor = &scale + &remaining * &tol_num;
                    &intermediary_amounts[i + 1] * factor / &scale
                })
                .collect();
            Ok(SwapBounds {
                amount_in: max_amount_in(first, tolerance)?,
                hop_limits,
            })
        }
    }
}
