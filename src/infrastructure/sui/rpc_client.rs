//! Sui JSON-RPC client for balances and coin metadata

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::services::BalanceSource;
use crate::infrastructure::http::{build_client, post_json, DEFAULT_REQUEST_TIMEOUT};
use crate::shared::errors::ServiceError;
use crate::shared::types::{CoinMetadata, DEFAULT_COIN_DECIMALS};
use crate::shared::utils::from_base_units;

pub const SUI_MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// `suix_getCoinMetadata` result
#[derive(Debug, Deserialize)]
struct RpcCoinMetadata {
    decimals: u8,
    name: String,
    symbol: String,
}

/// `suix_getBalance` result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBalance {
    total_balance: String,
}

impl From<RpcCoinMetadata> for CoinMetadata {
    fn from(raw: RpcCoinMetadata) -> Self {
        Self {
            name: raw.name,
            symbol: raw.symbol,
            decimals: raw.decimals,
        }
    }
}

fn ui_balance(raw: &RpcBalance, decimals: u8) -> Result<Decimal, ServiceError> {
    let base_units: u128 = raw.total_balance.parse().map_err(|_| {
        ServiceError::InvalidResponse(format!("totalBalance {:?}", raw.total_balance))
    })?;
    from_base_units(base_units, decimals).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

/// Sui fullnode client. Coin metadata never changes, so it is cached per coin type.
pub struct SuiRpcClient {
    http_client: Client,
    url: String,
    next_id: AtomicU64,
    metadata_cache: RwLock<HashMap<String, Option<CoinMetadata>>>,
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        Ok(Self {
            http_client: build_client(timeout)?,
            url: url.into(),
            next_id: AtomicU64::new(1),
            metadata_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn mainnet() -> Result<Self, ServiceError> {
        Self::new(SUI_MAINNET_RPC, DEFAULT_REQUEST_TIMEOUT)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, ServiceError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("sui rpc {} #{}", method, request.id);

        let response: JsonRpcResponse<T> = post_json(&self.http_client, &self.url, &request).await?;
        if let Some(err) = response.error {
            return Err(ServiceError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(response.result)
    }

    async fn decimals(&self, coin_type: &str) -> Result<u8, ServiceError> {
        Ok(self
            .coin_metadata(coin_type)
            .await?
            .map(|meta| meta.decimals)
            .unwrap_or(DEFAULT_COIN_DECIMALS))
    }
}

#[async_trait]
impl BalanceSource for SuiRpcClient {
    async fn coin_metadata(&self, coin_type: &str) -> Result<Option<CoinMetadata>, ServiceError> {
        if let Some(cached) = self.metadata_cache.read().await.get(coin_type) {
            return Ok(cached.clone());
        }

        let metadata = self
            .call::<RpcCoinMetadata>("suix_getCoinMetadata", json!([coin_type]))
            .await?
            .map(CoinMetadata::from);
        if metadata.is_none() {
            info!("no coin metadata for {}, assuming {} decimals", coin_type, DEFAULT_COIN_DECIMALS);
        }

        self.metadata_cache
            .write()
            .await
            .insert(coin_type.to_string(), metadata.clone());
        Ok(metadata)
    }

    async fn balance(&self, owner: &str, coin_type: &str) -> Result<Decimal, ServiceError> {
        let decimals = self.decimals(coin_type).await?;
        let raw = self
            .call::<RpcBalance>("suix_getBalance", json!([owner, coin_type]))
            .await?
            .ok_or_else(|| ServiceError::InvalidResponse("suix_getBalance returned null".to_string()))?;
        ui_balance(&raw, decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_response_is_scaled_exactly() {
        let response: JsonRpcResponse<RpcBalance> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{"coinType":"0x2::sui::SUI","coinObjectCount":3,"totalBalance":"12345678901","lockedBalance":{}}}"#,
        )
        .unwrap();
        let balance = ui_balance(&response.result.unwrap(), 9).unwrap();
        assert_eq!(balance, dec!(12.345678901));
    }

    #[test]
    fn test_balance_rejects_garbage() {
        let raw = RpcBalance {
            total_balance: "12.5".to_string(),
        };
        assert!(matches!(
            ui_balance(&raw, 9),
            Err(ServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_metadata_response() {
        let response: JsonRpcResponse<RpcCoinMetadata> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":2,"result":{"decimals":9,"name":"Cetus Token","symbol":"CETUS","description":"","iconUrl":null,"id":"0x4c0d"}}"#,
        )
        .unwrap();
        let metadata = CoinMetadata::from(response.result.unwrap());
        assert_eq!(metadata.symbol, "CETUS");
        assert_eq!(metadata.decimals, 9);

        let missing: JsonRpcResponse<RpcCoinMetadata> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap();
        assert!(missing.result.is_none());
    }

    #[test]
    fn test_rpc_error_body() {
        let response: JsonRpcResponse<RpcBalance> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":-32602,"message":"Invalid params"}}"#,
        )
        .unwrap();
        let err = response.error.unwrap();
        assert_eq!(err.code, -32602);
        assert_eq!(err.message, "Invalid params");
    }

    #[tokio::test]
    async fn test_cached_metadata_skips_the_network() {
        // unroutable endpoint: any request would fail
        let client = SuiRpcClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        client.metadata_cache.write().await.insert(
            "0x2::sui::SUI".to_string(),
            Some(CoinMetadata {
                name: "Sui".to_string(),
                symbol: "SUI".to_string(),
                decimals: 9,
            }),
        );
        let metadata = client.coin_metadata("0x2::sui::SUI").await.unwrap();
        assert_eq!(metadata.map(|m| m.symbol), Some("SUI".to_string()));
        assert_eq!(client.decimals("0x2::sui::SUI").await.unwrap(), 9);
    }
}
