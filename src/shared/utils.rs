//! Utility functions and helpers: exact decimal parsing and display formatting

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::shared::errors::FormError;

/// Fractional digits kept by [`format_number`]
pub const DISPLAY_FRACTION_DIGITS: usize = 10;

/// Parse a plain decimal literal. Accepts an optional sign and the `1.` / `.5`
/// shorthands; a lone `.` is rejected.
pub fn parse_decimal(text: &str) -> Result<Decimal, FormError> {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let well_formed = !digits.is_empty()
        && digits != "."
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.');
    if !well_formed {
        return Err(FormError::InvalidNumber(text.to_string()));
    }

    let mut canonical = String::with_capacity(digits.len() + 3);
    canonical.push_str(sign);
    if digits.starts_with('.') {
        canonical.push('0');
    }
    canonical.push_str(digits);
    if digits.ends_with('.') {
        canonical.push('0');
    }

    Decimal::from_str(&canonical).map_err(|_| FormError::InvalidNumber(text.to_string()))
}

/// Parse a user-typed amount. Thousands separators are ignored and an empty
/// field means "no amount".
pub fn parse_amount(text: &str) -> Result<Option<Decimal>, FormError> {
    let cleaned = strip_separators(text);
    if cleaned.is_empty() {
        return Ok(None);
    }
    parse_decimal(&cleaned).map(Some)
}

pub fn strip_separators(text: &str) -> String {
    text.replace(',', "")
}

/// Shortest exact representation, without trailing zeros.
pub fn canonical_string(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Group the integer part in thousands and truncate the fraction to
/// [`DISPLAY_FRACTION_DIGITS`] digits.
pub fn format_number(value: Decimal) -> String {
    let text = canonical_string(value);
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (unsigned, ""),
    };

    let grouped = group_thousands(integer);
    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        let kept = &fraction[..fraction.len().min(DISPLAY_FRACTION_DIGITS)];
        format!("{}{}.{}", sign, grouped, kept)
    }
}

/// [`format_number`] over typed text; text that is not a number is returned as is.
pub fn format_number_text(text: &str) -> String {
    match parse_amount(text) {
        Ok(Some(value)) => format_number(value),
        Ok(None) => String::new(),
        Err(_) => text.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Round half away from zero and pad to exactly `dp` fractional digits.
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Balance display. `None` means the value is still being fetched.
pub fn format_balance(value: Option<Decimal>, decimals: Option<u8>) -> String {
    match value {
        Some(value) => {
            let dp = decimals.map(u32::from).unwrap_or(DISPLAY_FRACTION_DIGITS as u32);
            format_number(value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        }
        None => "Loading...".to_string(),
    }
}

pub fn format_usd(value: Decimal) -> String {
    format!("${}", to_fixed(value, 2))
}

/// `0x1234...cdef`
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Validate a Sui address and return it in its full 32-byte lowercase form.
pub fn normalize_sui_address(address: &str) -> Result<String, FormError> {
    let trimmed = address.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| FormError::InvalidAddress(address.to_string()))?;
    if body.is_empty() || body.len() > 64 {
        return Err(FormError::InvalidAddress(address.to_string()));
    }

    let padded = format!("{:0>64}", body.to_ascii_lowercase());
    hex::decode(&padded).map_err(|_| FormError::InvalidAddress(address.to_string()))?;
    Ok(format!("0x{}", padded))
}

fn pow10(decimals: u8) -> Result<Decimal, FormError> {
    10i128
        .checked_pow(u32::from(decimals))
        .and_then(|p| Decimal::try_from_i128_with_scale(p, 0).ok())
        .ok_or_else(|| FormError::AmountOutOfRange(format!("10^{}", decimals)))
}

/// Convert a UI amount to integer base units, rounding down.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u128, FormError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(FormError::AmountOutOfRange(amount.to_string()));
    }
    amount
        .checked_mul(pow10(decimals)?)
        .and_then(|scaled| scaled.floor().to_u128())
        .ok_or_else(|| FormError::AmountOutOfRange(amount.to_string()))
}

/// Convert integer base units back to a UI amount, exactly.
pub fn from_base_units(raw: u128, decimals: u8) -> Result<Decimal, FormError> {
    i128::try_from(raw)
        .ok()
        .and_then(|raw| Decimal::try_from_i128_with_scale(raw, u32::from(decimals)).ok())
        .map(|value| value.normalize())
        .ok_or_else(|| FormError::AmountOutOfRange(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.5").unwrap(), Some(dec!(1234.5)));
        assert_eq!(parse_amount("").unwrap(), None);
        assert_eq!(parse_amount(",").unwrap(), None);
        assert_eq!(parse_amount(".5").unwrap(), Some(dec!(0.5)));
        assert_eq!(parse_amount("1.").unwrap(), Some(dec!(1)));
        assert!(parse_amount(".").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.2.3").is_err());
    }

    #[test]
    fn test_parse_decimal_accepts_sign() {
        assert_eq!(parse_decimal("-3").unwrap(), dec!(-3));
        assert_eq!(parse_decimal("+0.25").unwrap(), dec!(0.25));
        assert!(parse_decimal("-").is_err());
        assert!(parse_decimal("1e3").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(dec!(1234567.891)), "1,234,567.891");
        assert_eq!(format_number(dec!(0)), "0");
        assert_eq!(format_number(dec!(1.50)), "1.5");
        assert_eq!(format_number(dec!(999)), "999");
        assert_eq!(format_number(dec!(1000)), "1,000");
        assert_eq!(format_number(dec!(-1234.5)), "-1,234.5");
        // truncated, not rounded
        assert_eq!(format_number(dec!(0.123456789099)), "0.1234567890");
    }

    #[test]
    fn test_format_number_text() {
        assert_eq!(format_number_text("12345.6"), "12,345.6");
        assert_eq!(format_number_text("0."), "0");
        assert_eq!(format_number_text(""), "");
        assert_eq!(format_number_text("."), ".");
    }

    #[test]
    fn test_to_fixed_rounds_half_up() {
        assert_eq!(to_fixed(dec!(1.005), 2), "1.01");
        assert_eq!(to_fixed(dec!(-1.005), 2), "-1.01");
        assert_eq!(to_fixed(dec!(2.5), 0), "3");
        assert_eq!(to_fixed(dec!(1), 4), "1.0000");
        assert_eq!(to_fixed(dec!(0.12344), 4), "0.1234");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(None, Some(6)), "Loading...");
        assert_eq!(format_balance(Some(dec!(1234.56789)), Some(2)), "1,234.57");
        assert_eq!(format_balance(Some(dec!(1.5)), None), "1.5");
        assert_eq!(format_usd(dec!(12.345)), "$12.35");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("0x1234567890abcdef"), "0x1234...cdef");
    }

    #[test]
    fn test_normalize_sui_address() {
        assert_eq!(
            normalize_sui_address("0x2").unwrap(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert!(normalize_sui_address("0xzz").is_err());
        assert!(normalize_sui_address("1234").is_err());
        assert!(normalize_sui_address(&format!("0x{}", "a".repeat(65))).is_err());
    }

    #[test]
    fn test_base_unit_conversion() {
        assert_eq!(to_base_units(dec!(1.5), 9).unwrap(), 1_500_000_000);
        assert_eq!(to_base_units(dec!(0.0000000019), 9).unwrap(), 1);
        assert_eq!(to_base_units(dec!(0), 9).unwrap(), 0);
        assert!(to_base_units(dec!(-1), 9).is_err());

        assert_eq!(from_base_units(1_500_000_000, 9).unwrap(), dec!(1.5));
        assert_eq!(from_base_units(1, 6).unwrap(), dec!(0.000001));
    }
}
