//! Exchange rate between the pay and receive amounts

use rust_decimal::Decimal;

use crate::shared::types::TokenPair;
use crate::shared::utils::to_fixed;

/// Which way the rate line is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateDirection {
    /// `1 {to} = x {from}`
    #[default]
    PerReceived,
    /// `1 {from} = x {to}`
    PerPaid,
}

impl RateDirection {
    pub fn toggled(self) -> Self {
        match self {
            RateDirection::PerReceived => RateDirection::PerPaid,
            RateDirection::PerPaid => RateDirection::PerReceived,
        }
    }
}

/// Pay amount per received unit; zero while either side is unknown.
pub fn exchange_rate(paid: Option<Decimal>, received: Option<Decimal>) -> Decimal {
    match (paid, received) {
        (Some(paid), Some(received)) if !received.is_zero() => {
            paid.checked_div(received).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

pub fn reversed_exchange_rate(rate: Decimal) -> Decimal {
    if rate > Decimal::ZERO {
        Decimal::ONE.checked_div(rate).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

pub fn rate_label(direction: RateDirection, pair: &TokenPair, rate: Decimal) -> String {
    match direction {
        RateDirection::PerReceived => format!(
            "1 {} = {} {}",
            pair.to.symbol,
            to_fixed(rate, 4),
            pair.from.symbol
        ),
        RateDirection::PerPaid => format!(
            "1 {} = {} {}",
            pair.from.symbol,
            to_fixed(reversed_exchange_rate(rate), 4),
            pair.to.symbol
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_and_inverse() {
        let rate = exchange_rate(Some(dec!(2)), Some(dec!(50)));
        assert_eq!(rate, dec!(0.04));
        assert_eq!(reversed_exchange_rate(rate), dec!(25));
    }

    #[test]
    fn test_rate_is_zero_without_quote() {
        assert_eq!(exchange_rate(None, Some(dec!(1))), Decimal::ZERO);
        assert_eq!(exchange_rate(Some(dec!(1)), None), Decimal::ZERO);
        assert_eq!(exchange_rate(Some(dec!(1)), Some(dec!(0))), Decimal::ZERO);
        assert_eq!(reversed_exchange_rate(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_rate_labels() {
        let pair = TokenPair::default();
        let rate = exchange_rate(Some(dec!(1)), Some(dec!(3)));
        assert_eq!(
            rate_label(RateDirection::PerReceived, &pair, rate),
            "1 CETUS = 0.3333 SUI"
        );
        assert_eq!(
            rate_label(RateDirection::PerPaid, &pair, rate),
            "1 SUI = 3.0000 CETUS"
        );
        assert_eq!(RateDirection::default().toggled(), RateDirection::PerPaid);
    }
}
