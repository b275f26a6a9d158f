//! Aftermath API request/response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::errors::ServiceError;
use crate::shared::types::{RoutePath, TradeQuote, TradeRoute};
use crate::shared::utils::from_base_units;

/// `POST /router/trade-route`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TradeRouteRequest<'a> {
    pub coin_in_type: &'a str,
    /// Base units with the `n` bigint suffix, e.g. `"1500000000n"`
    pub coin_in_amount: String,
    pub coin_out_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TradeRouteResponse {
    #[serde(default)]
    pub routes: Vec<ApiRoute>,
    pub coin_out: Option<ApiCoin>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRoute {
    #[serde(default)]
    pub paths: Vec<ApiPath>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPath {
    pub protocol_name: String,
    pub coin_in: ApiCoin,
    pub coin_out: ApiCoin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCoin {
    #[serde(rename = "type", default)]
    pub coin_type: String,
    pub amount: Option<String>,
}

/// `POST /price-info`
#[derive(Debug, Serialize)]
pub(crate) struct PriceInfoRequest<'a> {
    pub coins: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPriceInfo {
    pub price: Decimal,
}

pub(crate) fn bigint_literal(base_units: u128) -> String {
    format!("{}n", base_units)
}

pub(crate) fn parse_bigint_literal(text: &str) -> Result<u128, ServiceError> {
    text.trim()
        .trim_end_matches('n')
        .parse()
        .map_err(|_| ServiceError::InvalidResponse(format!("amount {:?}", text)))
}

impl TradeRouteResponse {
    /// Convert to a quote, scaling the output by the destination coin decimals.
    pub(crate) fn into_quote(self, out_decimals: u8) -> Result<TradeQuote, ServiceError> {
        if self.routes.is_empty() {
            return Err(ServiceError::NoRoute);
        }
        let raw_out = self
            .coin_out
            .and_then(|coin| coin.amount)
            .ok_or_else(|| {
                ServiceError::InvalidResponse("No output amount found in response".to_string())
            })?;
        let output_amount = from_base_units(parse_bigint_literal(&raw_out)?, out_decimals)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        let routes = self
            .routes
            .into_iter()
            .map(|route| TradeRoute {
                paths: route
                    .paths
                    .into_iter()
                    .map(|path| RoutePath {
                        protocol_name: path.protocol_name,
                        coin_in_type: path.coin_in.coin_type,
                        coin_out_type: path.coin_out.coin_type,
                    })
                    .collect(),
            })
            .collect();

        Ok(TradeQuote {
            output_amount,
            routes,
        })
    }
}
