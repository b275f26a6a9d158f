//! Interfaces of the external collaborators the form drives

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::shared::errors::ServiceError;
use crate::shared::types::{CoinMetadata, PriceQuote, TokenPair, TradeQuote, WalletAccount};

/// Browser-style wallet: detection and account connection
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &str;

    fn is_installed(&self) -> bool;

    async fn connect(&self) -> Result<WalletAccount, ServiceError>;
}

/// On-chain balances and coin metadata
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// `Ok(None)` when the chain has no metadata for the coin.
    async fn coin_metadata(&self, coin_type: &str) -> Result<Option<CoinMetadata>, ServiceError>;

    /// Balance in UI units (already scaled by the coin decimals).
    async fn balance(&self, owner: &str, coin_type: &str) -> Result<Decimal, ServiceError>;
}

/// USD prices
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price(&self, coin_type: &str) -> Result<PriceQuote, ServiceError>;
}

/// Aggregator route finding
#[async_trait]
pub trait RouteQuoter: Send + Sync {
    /// Quote `amount` (UI units) of `pair.from` into `pair.to`.
    async fn trade_route(&self, pair: &TokenPair, amount: Decimal) -> Result<TradeQuote, ServiceError>;
}
