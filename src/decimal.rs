//! Fixed-precision monetary arithmetic helpers.
//!
//! Rules never compare amounts as floats. Quantization (when a client
//! configures `amount_quantize`, e.g. `"0.01"`) rounds to the number of
//! decimal places implied by the increment string, using banker's
//! rounding (round-half-to-even).

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a decimal-increment configuration string (e.g. `"0.01"`) into a
/// `Decimal`. Returns `None` for an empty or unparseable string rather than
/// erroring — callers treat an absent/bad increment as "no quantization".
pub fn parse_increment(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Quantize `value` to the scale implied by `increment` (its number of
/// decimal places) using banker's rounding. If `increment` is `None`, the
/// value is returned unchanged (exact decimal equality is used).
pub fn quantize(value: Decimal, increment: Option<Decimal>) -> Decimal {
    match increment {
        Some(inc) => value.round_dp_with_strategy(inc.scale(), RoundingStrategy::MidpointNearestEven),
        None => value,
    }
}

/// Quantize both operands the same way and compare for equality.
pub fn quantized_eq(a: Decimal, b: Decimal, increment: Option<Decimal>) -> bool {
    quantize(a, increment) == quantize(b, increment)
}

/// `|a| <= |b|`, decimal-exact.
pub fn abs_le(a: Decimal, threshold: Decimal) -> bool {
    a.abs() <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_increment_basic() {
        assert_eq!(parse_increment("0.01"), Some(dec!(0.01)));
        assert_eq!(parse_increment(""), None);
        assert_eq!(parse_increment("not-a-number"), None);
    }

    #[test]
    fn quantize_rounds_half_to_even() {
        let inc = parse_increment("0.01");
        assert_eq!(quantize(dec!(1.005), inc), dec!(1.00));
        assert_eq!(quantize(dec!(1.015), inc), dec!(1.02));
    }

    #[test]
    fn quantize_none_is_identity() {
        assert_eq!(quantize(dec!(1.23456), None), dec!(1.23456));
    }

    #[test]
    fn quantized_eq_treats_sub_increment_noise_as_equal() {
        let inc = parse_increment("0.01");
        assert!(quantized_eq(dec!(10.001), dec!(10.0), inc));
        assert!(!quantized_eq(dec!(10.02), dec!(10.00), inc));
    }
}
