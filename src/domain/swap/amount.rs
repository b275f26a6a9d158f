//! Pay-amount input validation and clamping against the spendable balance

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::shared::utils::{canonical_string, parse_amount, strip_separators};

/// Digits with at most one decimal point and at most 10 fractional digits.
static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]*\.?[0-9]{0,10}$").expect("amount pattern compiles"));

/// Outcome of a single edit of the pay-amount field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountEdit {
    /// Rejected keystroke; the field keeps its previous text.
    Ignored,
    /// Taken as typed. `clears_quote` is set when the field is now empty or zero.
    Accepted { text: String, clears_quote: bool },
    /// Above the spendable balance; the field is replaced by the balance.
    Clamped { text: String },
}

pub fn validate_amount_edit(raw: &str, max_balance: Decimal) -> AmountEdit {
    let value = strip_separators(raw);
    if !AMOUNT_PATTERN.is_match(&value) {
        debug!("rejecting amount edit {:?}", raw);
        return AmountEdit::Ignored;
    }

    let numeric = match parse_amount(&value) {
        Ok(parsed) => parsed.unwrap_or(Decimal::ZERO),
        Err(err) if value == "." => {
            debug!("amount edit {:?} is not a number: {}", raw, err);
            return AmountEdit::Ignored;
        }
        // digits only, so the value is beyond what Decimal holds
        Err(_) => {
            debug!("amount edit {:?} overflows, clamping to balance", raw);
            return AmountEdit::Clamped {
                text: canonical_string(max_balance),
            };
        }
    };

    if value.is_empty() || (numeric <= max_balance && !numeric.is_sign_negative()) {
        AmountEdit::Accepted {
            clears_quote: value.is_empty() || numeric.is_zero(),
            text: value,
        }
    } else {
        AmountEdit::Clamped {
            text: canonical_string(max_balance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn accepted(text: &str, clears_quote: bool) -> AmountEdit {
        AmountEdit::Accepted {
            text: text.to_string(),
            clears_quote,
        }
    }

    #[test]
    fn test_accepts_amounts_within_balance() {
        assert_eq!(validate_amount_edit("1.25", dec!(10)), accepted("1.25", false));
        assert_eq!(validate_amount_edit("10", dec!(10)), accepted("10", false));
        assert_eq!(validate_amount_edit("1.", dec!(10)), accepted("1.", false));
        assert_eq!(validate_amount_edit("1,000", dec!(5000)), accepted("1000", false));
    }

    #[test]
    fn test_empty_and_zero_clear_the_quote() {
        assert_eq!(validate_amount_edit("", dec!(10)), accepted("", true));
        assert_eq!(validate_amount_edit("0", dec!(10)), accepted("0", true));
        assert_eq!(validate_amount_edit("0.000", dec!(10)), accepted("0.000", true));
        // nothing to spend still allows typing zero
        assert_eq!(validate_amount_edit("0.", dec!(0)), accepted("0.", true));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(validate_amount_edit("abc", dec!(10)), AmountEdit::Ignored);
        assert_eq!(validate_amount_edit("1.2.3", dec!(10)), AmountEdit::Ignored);
        assert_eq!(validate_amount_edit("-1", dec!(10)), AmountEdit::Ignored);
        assert_eq!(validate_amount_edit(".", dec!(10)), AmountEdit::Ignored);
        // 11 fractional digits
        assert_eq!(validate_amount_edit("0.12345678901", dec!(10)), AmountEdit::Ignored);
    }

    #[test]
    fn test_clamps_to_balance() {
        assert_eq!(
            validate_amount_edit("10.5", dec!(10.250)),
            AmountEdit::Clamped {
                text: "10.25".to_string()
            }
        );
        assert_eq!(
            validate_amount_edit("1", dec!(0)),
            AmountEdit::Clamped {
                text: "0".to_string()
            }
        );
    }

    #[test]
    fn test_amount_too_large_for_decimal_is_clamped() {
        assert_eq!(
            validate_amount_edit("100000000000000000000000000000", dec!(10)),
            AmountEdit::Clamped {
                text: "10".to_string()
            }
        );
        assert_eq!(
            validate_amount_edit("99999999999999999999999999999999.5", dec!(2.5)),
            AmountEdit::Clamped {
                text: "2.5".to_string()
            }
        );
    }
}
