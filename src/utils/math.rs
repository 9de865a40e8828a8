//! Exact conversion between decimal strings and integer minor units

use alloy::primitives::{I256, U256};
use rust_decimal::Decimal;
use crate::errors::{AuditError, AuditResult};

/// Converts a decimal string into integer minor units at `decimals` places.
///
/// Fractional digits past `decimals` are truncated, never rounded. A value without
/// a fractional separator is taken to be in minor units already. Empty input is zero.
pub fn normalize(value: &str, decimals: u8) -> AuditResult<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(U256::ZERO);
    }

    let digits = match value.split_once('.') {
        Some((integer, fraction)) => {
            if integer.is_empty() && fraction.is_empty() {
                return Err(AuditError::malformed(value, "no digits"));
            }
            ensure_digits(value, integer)?;
            ensure_digits(value, fraction)?;

            let places = usize::from(decimals);
            let kept = &fraction[..fraction.len().min(places)];
            let mut digits = String::with_capacity(integer.len() + places);
            digits.push_str(integer);
            digits.push_str(kept);
            digits.push_str(&"0".repeat(places - kept.len()));
            digits
        }
        None => {
            ensure_digits(value, value)?;
            value.to_string()
        }
    };

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(&digits, 10)
        .map_err(|e| AuditError::Overflow(format!("{value} at {decimals} decimals: {e}")))
}

fn ensure_digits(value: &str, part: &str) -> AuditResult<()> {
    match part.chars().find(|c| !c.is_ascii_digit()) {
        Some(c) => Err(AuditError::malformed(value, format!("unexpected character {c:?}"))),
        None => Ok(()),
    }
}

/// Renders a signed minor-unit amount as a decimal at `decimals` places.
pub fn to_decimal(amount: I256, decimals: u8) -> AuditResult<Decimal> {
    let raw = i128::try_from(amount)
        .map_err(|_| AuditError::Overflow(format!("{amount} does not fit a decimal")))?;
    Decimal::try_from_i128_with_scale(raw, u32::from(decimals))
        .map_err(|e| AuditError::Overflow(format!("{amount} at {decimals} decimals: {e}")))
}

/// Unsigned counterpart of [`to_decimal`].
pub fn to_decimal_unsigned(amount: U256, decimals: u8) -> AuditResult<Decimal> {
    to_decimal(to_signed(amount)?, decimals)
}

pub fn to_signed(amount: U256) -> AuditResult<I256> {
    I256::try_from(amount).map_err(|_| AuditError::Overflow(format!("{amount} exceeds i256")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_and_empty_are_zero() {
        assert_eq!(normalize("", 18).unwrap(), U256::ZERO);
        assert_eq!(normalize("0", 0).unwrap(), U256::ZERO);
        assert_eq!(normalize("0", 18).unwrap(), U256::ZERO);
        assert_eq!(normalize("0.0", 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn excess_fraction_is_truncated() {
        assert_eq!(normalize("1.23456789", 4).unwrap(), U256::from(12345));
        assert_eq!(normalize("0.99999", 2).unwrap(), U256::from(99));
    }

    #[test]
    fn short_fraction_is_padded() {
        assert_eq!(normalize("2.5", 6).unwrap(), U256::from(2_500_000));
        assert_eq!(normalize(".5", 3).unwrap(), U256::from(500));
        assert_eq!(normalize("7.", 2).unwrap(), U256::from(700));
    }

    #[test]
    fn integers_pass_through_as_minor_units() {
        assert_eq!(normalize("1000", 18).unwrap(), U256::from(1000));
        assert_eq!(normalize("1000", 0).unwrap(), U256::from(1000));
    }

    #[test]
    fn large_reserves_exceed_u64() {
        let reserve = normalize("123456789012345.123456789012345678", 18).unwrap();
        let expected = U256::from_str_radix("123456789012345123456789012345678", 10).unwrap();
        assert_eq!(reserve, expected);
        assert!(reserve > U256::from(u64::MAX));
    }

    #[test]
    fn malformed_input_is_rejected() {
        for bad in ["abc", "1.2.3", "-5", "1e18", "0x10", ".", "1,5"] {
            assert!(
                matches!(normalize(bad, 18), Err(AuditError::MalformedDecimal { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn values_past_u256_overflow() {
        let huge = "9".repeat(80);
        assert!(matches!(normalize(&huge, 0), Err(AuditError::Overflow(_))));
    }

    #[test]
    fn minor_units_render_back_to_decimals() {
        let gain = to_decimal(I256::try_from(200i64).unwrap(), 18).unwrap();
        assert_eq!(gain, dec!(0.0000000000000002));

        let loss = to_decimal(I256::try_from(-1_500_000i64).unwrap(), 6).unwrap();
        assert_eq!(loss, dec!(-1.5));

        let unsigned = to_decimal_unsigned(U256::from(4_800_000_000_000_000u64), 18).unwrap();
        assert_eq!(unsigned, dec!(0.0048));
    }

    proptest! {
        #[test]
        fn integer_strings_pass_through(n in any::<u64>(), d in 0u8..=36) {
            prop_assert_eq!(normalize(&n.to_string(), d).unwrap(), U256::from(n));
        }

        #[test]
        fn fraction_scales_by_decimals(int in 0u64..1_000_000, frac in 0u32..1000, d in 3u8..=30) {
            let value = format!("{int}.{frac:03}");
            let scaled = U256::from(int) * U256::from(10).pow(U256::from(d))
                + U256::from(frac) * U256::from(10).pow(U256::from(d - 3));
            prop_assert_eq!(normalize(&value, d).unwrap(), scaled);
        }

        #[test]
        fn normalization_is_deterministic(s in "[0-9]{0,20}(\\.[0-9]{0,30})?", d in 0u8..=24) {
            prop_assert_eq!(normalize(&s, d).ok(), normalize(&s, d).ok());
        }
    }
}
