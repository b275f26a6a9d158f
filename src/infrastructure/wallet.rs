//! Wallet provider for hosts without a browser extension: the account is the
//! address found in the configuration.

use async_trait::async_trait;
use tracing::info;

use crate::domain::services::WalletProvider;
use crate::shared::errors::ServiceError;
use crate::shared::types::WalletAccount;
use crate::shared::utils::normalize_sui_address;

pub const SUI_WALLET_NAME: &str = "Sui Wallet";

#[derive(Debug, Clone)]
pub struct ConfiguredWallet {
    name: String,
    address: Option<String>,
}

impl ConfiguredWallet {
    pub fn new(address: Option<String>) -> Self {
        Self {
            name: SUI_WALLET_NAME.to_string(),
            address: address.filter(|a| !a.trim().is_empty()),
        }
    }
}

#[async_trait]
impl WalletProvider for ConfiguredWallet {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_installed(&self) -> bool {
        self.address.is_some()
    }

    async fn connect(&self) -> Result<WalletAccount, ServiceError> {
        let address = self.address.as_deref().ok_or_else(|| {
            ServiceError::Wallet(format!("{} is not installed or not detected", self.name))
        })?;
        let address =
            normalize_sui_address(address).map_err(|e| ServiceError::Wallet(e.to_string()))?;
        info!("{} connected", self.name);
        Ok(WalletAccount { address })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_with_configured_address() {
        let wallet = ConfiguredWallet::new(Some("0x2".to_string()));
        assert!(wallet.is_installed());
        let account = wallet.connect().await.unwrap();
        assert_eq!(
            account.address,
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[tokio::test]
    async fn test_missing_wallet() {
        let wallet = ConfiguredWallet::new(Some("  ".to_string()));
        assert!(!wallet.is_installed());
        assert!(matches!(wallet.connect().await, Err(ServiceError::Wallet(_))));
    }

    #[tokio::test]
    async fn test_invalid_address_fails_connect() {
        let wallet = ConfiguredWallet::new(Some("0xnothex".to_string()));
        assert!(wallet.is_installed());
        assert!(wallet.connect().await.is_err());
    }
}
