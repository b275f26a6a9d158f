//! Aftermath HTTP client

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::models::{bigint_literal, ApiPriceInfo, PriceInfoRequest, TradeRouteRequest, TradeRouteResponse};
use crate::domain::services::{BalanceSource, PriceSource, RouteQuoter};
use crate::infrastructure::http::{build_client, post_json};
use crate::shared::errors::ServiceError;
use crate::shared::types::{PriceQuote, TokenPair, TradeQuote, DEFAULT_COIN_DECIMALS};
use crate::shared::utils::to_base_units;

pub const AFTERMATH_API_BASE: &str = "https://aftermath.finance/api";

/// Aftermath router and price client. Amounts cross the API in base units, so
/// coin decimals are looked up through the chain metadata source.
pub struct AftermathClient {
    http_client: Client,
    base_url: String,
    metadata: Arc<dyn BalanceSource>,
}

impl AftermathClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        metadata: Arc<dyn BalanceSource>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            metadata,
        })
    }

    async fn decimals(&self, coin_type: &str) -> Result<u8, ServiceError> {
        Ok(self
            .metadata
            .coin_metadata(coin_type)
            .await?
            .map(|meta| meta.decimals)
            .unwrap_or(DEFAULT_COIN_DECIMALS))
    }
}

#[async_trait]
impl RouteQuoter for AftermathClient {
    async fn trade_route(&self, pair: &TokenPair, amount: Decimal) -> Result<TradeQuote, ServiceError> {
        let (in_decimals, out_decimals) = futures::try_join!(
            self.decimals(&pair.from.coin_type),
            self.decimals(&pair.to.coin_type)
        )?;
        let base_units = to_base_units(amount, in_decimals)
            .map_err(|e| ServiceError::InvalidRequest(e.to_string()))?;

        let request = TradeRouteRequest {
            coin_in_type: &pair.from.coin_type,
            coin_in_amount: bigint_literal(base_units),
            coin_out_type: &pair.to.coin_type,
        };
        let url = format!("{}/router/trade-route", self.base_url);
        let response: TradeRouteResponse = post_json(&self.http_client, &url, &request).await?;
        let quote = response.into_quote(out_decimals)?;

        info!(
            "aftermath route: {} {} -> {} {} ({} routes)",
            amount,
            pair.from.symbol,
            quote.output_amount,
            pair.to.symbol,
            quote.routes.len()
        );
        Ok(quote)
    }
}

#[async_trait]
impl PriceSource for AftermathClient {
    async fn price(&self, coin_type: &str) -> Result<PriceQuote, ServiceError> {
        let url = format!("{}/price-info", self.base_url);
        let request = PriceInfoRequest {
            coins: vec![coin_type],
        };
        let response: HashMap<String, ApiPriceInfo> =
            post_json(&self.http_client, &url, &request).await?;

        // unknown coins come back missing or with a negative price
        let price = match response.get(coin_type) {
            Some(info) if info.price >= Decimal::ZERO => info.price,
            _ => {
                warn!("no price for {}, using 0", coin_type);
                Decimal::ZERO
            }
        };

        Ok(PriceQuote {
            coin_type: coin_type.to_string(),
            price,
            fetched_at: Utc::now(),
        })
    }
}
