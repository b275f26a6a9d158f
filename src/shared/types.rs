//! Common types used across the application

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const SUI_COIN_TYPE: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI";
pub const CETUS_COIN_TYPE: &str =
    "0x06864a6f921804860930db6ddbe2e16acdf8504495ea7481637a1c8b9a8fe54b::cetus::CETUS";

/// Decimals assumed for a coin whose on-chain metadata could not be read
pub const DEFAULT_COIN_DECIMALS: u8 = 9;

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub coin_type: String,
}

impl Token {
    pub fn new(symbol: impl Into<String>, coin_type: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            coin_type: coin_type.into(),
        }
    }

    pub fn sui() -> Self {
        Self::new("SUI", SUI_COIN_TYPE)
    }

    pub fn cetus() -> Self {
        Self::new("CETUS", CETUS_COIN_TYPE)
    }
}

/// Short coin name of a Move coin type: `0x2::sui::SUI` -> `SUI`.
pub fn coin_short_name(coin_type: &str) -> &str {
    coin_type.split("::").nth(2).unwrap_or(coin_type)
}

/// The two tokens of the form, in swap direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub from: Token,
    pub to: Token,
}

impl TokenPair {
    pub fn new(from: Token, to: Token) -> Self {
        Self { from, to }
    }

    pub fn switched(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl Default for TokenPair {
    fn default() -> Self {
        Self::new(Token::sui(), Token::cetus())
    }
}

/// On-chain coin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Connected wallet account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
}

/// USD price of a coin at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub coin_type: String,
    pub price: Decimal,
    pub fetched_at: DateTime<Utc>,
}

/// One hop of an aggregator route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    pub protocol_name: String,
    pub coin_in_type: String,
    pub coin_out_type: String,
}

/// A complete route as returned by the aggregator
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeRoute {
    pub paths: Vec<RoutePath>,
}

impl TradeRoute {
    /// `SUI → USDC via Cetus → USDC → CETUS via Turbos`
    pub fn describe(&self) -> String {
        self.paths
            .iter()
            .map(|path| {
                format!(
                    "{} → {} via {}",
                    coin_short_name(&path.coin_in_type),
                    coin_short_name(&path.coin_out_type),
                    path.protocol_name
                )
            })
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Aggregator answer for a given input amount. Routes are ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub output_amount: Decimal,
    pub routes: Vec<TradeRoute>,
}

impl TradeQuote {
    pub fn best_route(&self) -> Option<&TradeRoute> {
        self.routes.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_short_name() {
        assert_eq!(coin_short_name(SUI_COIN_TYPE), "SUI");
        assert_eq!(coin_short_name(CETUS_COIN_TYPE), "CETUS");
        assert_eq!(coin_short_name("not-a-coin-type"), "not-a-coin-type");
    }

    #[test]
    fn test_pair_switch() {
        let pair = TokenPair::default();
        let switched = pair.switched();
        assert_eq!(switched.from.symbol, "CETUS");
        assert_eq!(switched.to.symbol, "SUI");
        assert_eq!(switched.switched(), pair);
    }

    #[test]
    fn test_route_description() {
        let route = TradeRoute {
            paths: vec![
                RoutePath {
                    protocol_name: "Cetus".to_string(),
                    coin_in_type: SUI_COIN_TYPE.to_string(),
                    coin_out_type: "0xdba3::usdc::USDC".to_string(),
                },
                RoutePath {
                    protocol_name: "Turbos".to_string(),
                    coin_in_type: "0xdba3::usdc::USDC".to_string(),
                    coin_out_type: CETUS_COIN_TYPE.to_string(),
                },
            ],
        };
        assert_eq!(
            route.describe(),
            "SUI → USDC via Cetus → USDC → CETUS via Turbos"
        );
        assert_eq!(TradeRoute::default().describe(), "");
    }
}
