//! AMM Calculator
//!
//! Swap math using constant product formula (x * y = k), mirrored from the
//! pair contract so off-chain quotes match on-chain execution to the unit.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a single hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HopError {
    #[error("insufficient liquidity")]
    InsufficientLiquidity,
}

/// Pool fee as an exact ratio: the pool keeps `keep / denom` of every input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeRatio {
    pub keep: BigUint,
    pub denom: BigUint,
}

impl FeeRatio {
    /// Build from a fee fraction in [0, 1). Returns `None` outside that range.
    pub fn from_fraction(fee_fraction: Decimal) -> Option<Self> {
        let (fee, denom) = decimal_ratio(fee_fraction)?;
        if fee >= denom {
            return None;
        }
        Some(Self {
            keep: &denom - fee,
            denom,
        })
    }
}

/// Split a non-negative decimal into an exact (numerator, denominator) pair.
pub fn decimal_ratio(value: Decimal) -> Option<(BigUint, BigUint)> {
    let mantissa = u128::try_from(value.mantissa()).ok()?;
    let denom = BigUint::from(10u32).pow(value.scale());
    Some((BigUint::from(mantissa), denom))
}

/// Calculate swap output for a fixed input
///
/// Formula: output = (reserves_out * input * keep) / (reserves_in * denom + input * keep)
///
/// Truncates like the contract does.
pub fn calculate_output(
    reserves_in: &BigUint,
    reserves_out: &BigUint,
    input_amount: &BigUint,
    fee: &FeeRatio,
) -> Result<BigUint, HopError> {
    if reserves_in.is_zero() || reserves_out.is_zero() {
        return Err(HopError::InsufficientLiquidity);
    }
    if input_amount.is_zero() {
        return Ok(BigUint::zero());
    }

    let input_with_fee = input_amount * &fee.keep;
    let numerator = reserves_out * &input_with_fee;
    let denominator = reserves_in * &fee.denom + &input_with_fee;

    let output = numerator / denominator;
    if &output >= reserves_out {
        return Err(HopError::InsufficientLiquidity);
    }
    Ok(output)
}

/// Calculate required input for desired output (reverse calculation)
///
/// Formula: input = ceil((reserves_in * output * denom) / ((reserves_out - output) * keep))
///
/// Rounds up so the pool is never under-paid.
pub fn calculate_input(
    reserves_in: &BigUint,
    reserves_out: &BigUint,
    output_amount: &BigUint,
    fee: &FeeRatio,
) -> Result<BigUint, HopError> {
    if reserves_in.is_zero() || output_amount >= reserves_out {
        return Err(HopError::InsufficientLiquidity);
    }
    if output_amount.is_zero() {
        return Ok(BigUint::zero());
    }
    if fee.keep.is_zero() {
        return Err(HopError::InsufficientLiquidity);
    }

    let numerator = reserves_in * output_amount * &fee.denom;
    let denominator = (reserves_out - output_amount) * &fee.keep;

    Ok(numerator.div_ceil(&denominator))
}

/// Units of `token_to` received per whole `token_from`, at the quoted rate.
///
/// rate = amount_to * 10^decimals_from / amount_from
pub fn calculate_exchange_rate(
    amount_from: &BigUint,
    amount_to: &BigUint,
    decimals_from: u32,
) -> BigUint {
    if amount_from.is_zero() {
        return BigUint::zero();
    }
    amount_to * BigUint::from(10u32).pow(decimals_from) / amount_from
}

/// Render a smallest-unit amount as a decimal string, trailing zeros trimmed.
///
/// `denominate_amount(1246248446862, 18)` is `"0.000001246248446862"`.
pub fn denominate_amount(amount: &BigUint, decimals: u32) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Calculate price impact as percentage, for logging route quality
pub fn calculate_price_impact(
    reserves_in: &BigUint,
    reserves_out: &BigUint,
    input_amount: &BigUint,
    output_amount: &BigUint,
) -> f64 {
    use num_traits::ToPrimitive;

    if input_amount.is_zero() || output_amount.is_zero() || reserves_in.is_zero() {
        return 0.0;
    }

    // spot / execution = (reserves_out * input) / (reserves_in * output)
    let ratio_num = reserves_out * input_amount;
    let ratio_den = reserves_in * output_amount;
    let spot_over_exec = match (ratio_num.to_f64(), ratio_den.to_f64()) {
        (Some(n), Some(d)) if d > 0.0 => n / d,
        _ => return 0.0,
    };
    if spot_over_exec == 0.0 {
        return 0.0;
    }
    ((spot_over_exec - 1.0) / spot_over_exec).abs() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn big(s: &str) -> BigUint {
        BigUint::from_str(s).unwrap()
    }

    fn fee_03() -> FeeRatio {
        FeeRatio::from_fraction(Decimal::from_str("0.003").unwrap()).unwrap()
    }

    #[test]
    fn test_fee_ratio() {
        let fee = fee_03();
        assert_eq!(fee.keep, BigUint::from(997u32));
        assert_eq!(fee.denom, BigUint::from(1000u32));

        assert!(FeeRatio::from_fraction(Decimal::ONE).is_none());
        assert!(FeeRatio::from_fraction(Decimal::from_str("-0.1").unwrap()).is_none());

        let zero = FeeRatio::from_fraction(Decimal::ZERO).unwrap();
        assert_eq!(zero.keep, zero.denom);
    }

    #[test]
    fn test_calculate_output_worked_example() {
        // 1 USDC into a TOK1/USDC pool holding 1 TOK1 and 800k USDC
        let output = calculate_output(
            &big("800000000000000000000000"),
            &big("1000000000000000000"),
            &big("1000000000000000000"),
            &fee_03(),
        )
        .unwrap();
        assert_eq!(output, big("1246248446862"));
    }

    #[test]
    fn test_calculate_output_zero_input() {
        let output =
            calculate_output(&big("1000"), &big("2000"), &BigUint::zero(), &fee_03()).unwrap();
        assert!(output.is_zero());
    }

    #[test]
    fn test_calculate_output_empty_pool() {
        assert_eq!(
            calculate_output(&big("1000"), &BigUint::zero(), &big("10"), &fee_03()),
            Err(HopError::InsufficientLiquidity)
        );
        assert_eq!(
            calculate_output(&BigUint::zero(), &big("1000"), &big("10"), &fee_03()),
            Err(HopError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_calculate_output_never_drains_pool() {
        // Tiny pool, huge input: output approaches but never reaches reserves
        let output =
            calculate_output(&big("1"), &big("1000"), &big("1000000000000"), &fee_03()).unwrap();
        assert!(output < big("1000"));
    }

    #[test]
    fn test_calculate_input_multi_hop_legs() {
        // TOK1 -> TOK2 leg: 0.5 TOK2 out of a 1 TOK1 / 2 TOK2 pool
        let tok1_needed = calculate_input(
            &big("1000000000000000000"),
            &big("2000000000000000000"),
            &big("500000000000000000"),
            &fee_03(),
        )
        .unwrap();
        assert_eq!(tok1_needed, big("334336342360414578"));

        // USDC -> TOK1 leg for the TOK1 computed above
        let usdc_needed = calculate_input(
            &big("800000000000000000000000"),
            &big("1000000000000000000"),
            &tok1_needed,
            &fee_03(),
        )
        .unwrap();
        assert_eq!(usdc_needed, big("403017188179304363800926"));
    }

    #[test]
    fn test_calculate_input_rounds_in_favor_of_pool() {
        let fee = fee_03();
        let reserves_in = big("123456789");
        let reserves_out = big("987654321");
        for wanted in ["1", "777", "1000000", "555555555"] {
            let wanted = big(wanted);
            let input = calculate_input(&reserves_in, &reserves_out, &wanted, &fee).unwrap();
            let produced = calculate_output(&reserves_in, &reserves_out, &input, &fee).unwrap();
            assert!(produced >= wanted, "{} < {}", produced, wanted);
        }
    }

    #[test]
    fn test_calculate_input_exceeds_reserves() {
        assert_eq!(
            calculate_input(&big("1000"), &big("1000"), &big("1000"), &fee_03()),
            Err(HopError::InsufficientLiquidity)
        );
        assert_eq!(
            calculate_input(&big("1000"), &big("1000"), &big("5000"), &fee_03()),
            Err(HopError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_exchange_rate() {
        let rate = calculate_exchange_rate(
            &big("1000000000000000000"),
            &big("1246248446862"),
            18,
        );
        assert_eq!(rate, big("1246248446862"));

        let inverse = calculate_exchange_rate(
            &big("1246248446862"),
            &big("1000000000000000000"),
            18,
        );
        assert_eq!(inverse, big("802408221665557136369171"));
        assert!(calculate_exchange_rate(&BigUint::zero(), &big("5"), 6).is_zero());
    }

    #[test]
    fn test_denominate_amount() {
        assert_eq!(denominate_amount(&big("1246248446862"), 18), "0.000001246248446862");
        assert_eq!(
            denominate_amount(&big("802408221665557136369171"), 18),
            "802408.221665557136369171"
        );
        assert_eq!(denominate_amount(&big("1500000"), 6), "1.5");
        assert_eq!(denominate_amount(&big("2000000"), 6), "2");
        assert_eq!(denominate_amount(&big("42"), 0), "42");
        assert_eq!(denominate_amount(&BigUint::zero(), 3), "0");
    }

    #[test]
    fn test_calculate_price_impact() {
        // Spot price = 2.0, execution price = 1.8, impact = 10%
        let impact = calculate_price_impact(&big("1000"), &big("2000"), &big("100"), &big("180"));
        assert!((impact - 10.0).abs() < 0.1);
    }
}
