//! Slippage tolerance bounds and the minimum-received bound it implies

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::shared::utils::parse_decimal;

/// Percent
pub const DEFAULT_SLIPPAGE: Decimal = dec!(0.5);
pub const MAX_SLIPPAGE: Decimal = dec!(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlippageEdit {
    Set(Decimal),
    /// A number outside [0, 100]; the previous value stays.
    Ignored,
    /// Not a number; fall back to the default tolerance.
    Reset,
}

pub fn validate_slippage_edit(raw: &str) -> SlippageEdit {
    match parse_decimal(raw) {
        Ok(value) if value >= Decimal::ZERO && value <= MAX_SLIPPAGE => SlippageEdit::Set(value),
        Ok(value) => {
            debug!("slippage {} outside [0, {}]", value, MAX_SLIPPAGE);
            SlippageEdit::Ignored
        }
        Err(err) => {
            debug!("invalid slippage value: {}", err);
            SlippageEdit::Reset
        }
    }
}

/// Lowest output accepted under `slippage_percent`, rounded down to the coin's
/// precision.
pub fn minimum_received(expected_out: Decimal, slippage_percent: Decimal, decimals: u8) -> Decimal {
    let kept = (MAX_SLIPPAGE - slippage_percent.clamp(Decimal::ZERO, MAX_SLIPPAGE)) / MAX_SLIPPAGE;
    (expected_out * kept)
        .round_dp_with_strategy(u32::from(decimals), RoundingStrategy::ToZero)
        .normalize()
}
