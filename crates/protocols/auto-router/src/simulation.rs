//! Route Simulation & Selection
//!
//! Runs a swap amount through every hop of a candidate route and picks the
//! best candidate for the requested direction.

use std::cmp::Ordering;

use num_bigint::BigUint;
use num_traits::Zero;
use rayon::prelude::*;
use router_core::{Pool, Result, RouterError, TokenId};

use crate::calculator::{
    calculate_input, calculate_output, calculate_price_impact, FeeRatio, HopError,
};
use crate::state::{Route, SimulatedRoute, SwapDirection, SwapType};

fn hop_fee(pool: &Pool) -> Result<FeeRatio> {
    FeeRatio::from_fraction(pool.fee_fraction).ok_or_else(|| {
        RouterError::data_integrity(format!(
            "pool {} has fee {} outside [0, 1)",
            pool.address, pool.fee_fraction
        ))
    })
}

fn hop_failure(pool: &Pool, err: HopError) -> RouterError {
    match err {
        HopError::InsufficientLiquidity => RouterError::InsufficientLiquidity {
            pool: pool.address.to_string(),
        },
    }
}

/// Compute the per-hop amounts of a route.
///
/// Fixed input walks forward from the first pool; fixed output walks backward
/// from the last. The result has `tokens.len()` amounts.
pub fn simulate_route(route: &Route, direction: &SwapDirection) -> Result<SimulatedRoute> {
    route.validate()?;
    if let Some(inactive) = route.pools.iter().find(|p| !p.is_active()) {
        return Err(RouterError::PoolInactive {
            pool: inactive.address.to_string(),
        });
    }

    let hops = route.hop_count();
    let mut amounts = vec![BigUint::default(); hops + 1];

    match direction {
        SwapDirection::FixedInput(amount_in) => {
            amounts[0] = amount_in.clone();
            for i in 0..hops {
                let pool = &route.pools[i];
                let (reserve_in, reserve_out) = oriented_reserves(pool, &route.tokens[i])?;
                amounts[i + 1] =
                    calculate_output(reserve_in, reserve_out, &amounts[i], &hop_fee(pool)?)
                        .map_err(|e| hop_failure(pool, e))?;
                log_hop(pool, reserve_in, reserve_out, &amounts[i], &amounts[i + 1]);
                // A hop that truncates to nothing cannot be bounded against slippage
                if amounts[i + 1].is_zero() {
                    return Err(hop_failure(pool, HopError::InsufficientLiquidity));
                }
            }
        }
        SwapDirection::FixedOutput(amount_out) => {
            amounts[hops] = amount_out.clone();
            for i in (0..hops).rev() {
                let pool = &route.pools[i];
                let (reserve_in, reserve_out) = oriented_reserves(pool, &route.tokens[i])?;
                amounts[i] =
                    calculate_input(reserve_in, reserve_out, &amounts[i + 1], &hop_fee(pool)?)
                        .map_err(|e| hop_failure(pool, e))?;
                log_hop(pool, reserve_in, reserve_out, &amounts[i], &amounts[i + 1]);
            }
        }
    }

    Ok(SimulatedRoute {
        route: route.clone(),
        intermediary_amounts: amounts,
    })
}

fn log_hop(
    pool: &Pool,
    reserve_in: &BigUint,
    reserve_out: &BigUint,
    input: &BigUint,
    output: &BigUint,
) {
    tracing::trace!(
        pool = %pool.address,
        input = %input,
        output = %output,
        price_impact_pct = calculate_price_impact(reserve_in, reserve_out, input, output),
        "Simulated hop"
    );
}

fn oriented_reserves<'p>(pool: &'p Pool, token_in: &TokenId) -> Result<(&'p BigUint, &'p BigUint)> {
    pool.reserves_for(token_in).ok_or_else(|| {
        RouterError::invalid_route(format!("pool {} does not trade {}", pool.address, token_in))
    })
}

/// Simulate all candidates in parallel.
///
/// Candidates failing for a reason local to their own pools are dropped.
/// Any other failure aborts the whole batch. Output order follows input order.
pub fn simulate_candidates(
    routes: &[Route],
    direction: &SwapDirection,
) -> Result<Vec<SimulatedRoute>> {
    let outcomes: Vec<Result<SimulatedRoute>> = routes
        .par_iter()
        .map(|route| simulate_route(route, direction))
        .collect();

    let mut simulated = Vec::with_capacity(outcomes.len());
    for (route, outcome) in routes.iter().zip(outcomes) {
        match outcome {
            Ok(sim) => simulated.push(sim),
            Err(e) if e.is_route_local() => {
                tracing::debug!(route = %route, error = %e, "Discarding candidate route");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(simulated)
}

/// Total order on candidates, best first.
///
/// Primary key is the amount the direction optimizes; ties fall back to fewer
/// hops, then the token sequence, then the pool addresses.
pub fn compare_candidates(a: &SimulatedRoute, b: &SimulatedRoute, swap_type: SwapType) -> Ordering {
    let primary = match swap_type {
        SwapType::FixedInput => b.amount_out().cmp(a.amount_out()),
        SwapType::FixedOutput => a.amount_in().cmp(b.amount_in()),
    };
    primary
        .then_with(|| a.hop_count().cmp(&b.hop_count()))
        .then_with(|| a.route.tokens.cmp(&b.route.tokens))
        .then_with(|| a.route.pool_addresses().cmp(&b.route.pool_addresses()))
}

/// Pick the best simulated candidate, or `NoRouteFound` when none survived.
pub fn select_best_route(
    candidates: Vec<SimulatedRoute>,
    swap_type: SwapType,
    token_in: &TokenId,
    token_out: &TokenId,
) -> Result<SimulatedRoute> {
    candidates
        .into_iter()
        .min_by(|a, b| compare_candidates(a, b, swap_type))
        .ok_or_else(|| RouterError::NoRouteFound {
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
        })
}
