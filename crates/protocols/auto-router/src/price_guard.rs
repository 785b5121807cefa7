//! Price deviation guard
//!
//! Compares the rate implied by a quote with independent USD reference
//! prices. A large gap usually means a thin or manipulated pool on the route;
//! the result is advisory and never blocks a quote.

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::calculator::decimal_ratio;

/// Decimal places kept on reported percentages
pub const DEVIATION_SCALE: u32 = 6;

/// Largest mantissa a `Decimal` can hold (2^96 - 1)
const MAX_DECIMAL_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// One side of a quote valued in USD
#[derive(Debug, Clone, Copy)]
pub struct PricedAmount<'a> {
    pub amount: &'a BigUint,
    pub decimals: u32,
    pub price_usd: Decimal,
}

/// Deviation of the quoted rate from reference prices, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDeviation {
    /// How far the implied token-in price strays from its reference
    pub token_in_percent: Decimal,
    /// How far the implied token-out price strays from its reference
    pub token_out_percent: Decimal,
}

impl PriceDeviation {
    pub fn max_percent(&self) -> Decimal {
        self.token_in_percent.max(self.token_out_percent)
    }
}

fn percent_of(diff: &BigUint, base: &BigUint) -> Decimal {
    let scaled = diff * 100u32 * BigUint::from(10u32).pow(DEVIATION_SCALE) / base;
    match scaled.to_u128() {
        Some(v) if v <= MAX_DECIMAL_MANTISSA => {
            Decimal::from_i128_with_scale(v as i128, DEVIATION_SCALE)
        }
        _ => Decimal::MAX,
    }
}

/// Measure the deviation between the quote and the reference prices.
///
/// Returns `None` when either side has no usable reference price or amount.
/// With `R = implied token-out price / reference token-out price`, the
/// token-out deviation is `|R - 1|` and the token-in deviation `|1/R - 1|`.
pub fn price_deviation(input: PricedAmount<'_>, output: PricedAmount<'_>) -> Option<PriceDeviation> {
    if input.price_usd.is_zero() || output.price_usd.is_zero() {
        return None;
    }
    if input.amount.is_zero() || output.amount.is_zero() {
        return None;
    }
    let (m_in, d_in) = decimal_ratio(input.price_usd)?;
    let (m_out, d_out) = decimal_ratio(output.price_usd)?;
    let ten = BigUint::from(10u32);

    // R = num / den
    let num = m_in * input.amount * ten.pow(output.decimals) * d_out;
    let den = m_out * output.amount * ten.pow(input.decimals) * d_in;

    let diff = if num > den { &num - &den } else { &den - &num };
    Some(PriceDeviation {
        token_in_percent: percent_of(&diff, &num),
        token_out_percent: percent_of(&diff, &den),
    })
}

/// Largest deviation, reported only when it exceeds `max_percent`
pub fn check_price_deviation(
    input: PricedAmount<'_>,
    output: PricedAmount<'_>,
    max_percent: Decimal,
) -> Option<Decimal> {
    let deviation = price_deviation(input, output)?.max_percent();
    (deviation > max_percent).then_some(deviation)
}
