use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::domain::swap::DEFAULT_SLIPPAGE;
use crate::infrastructure::aftermath::AFTERMATH_API_BASE;
use crate::infrastructure::sui::SUI_MAINNET_RPC;
use crate::shared::types::{Token, TokenPair};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: SUI_MAINNET_RPC.to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregatorCfg {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for AggregatorCfg {
    fn default() -> Self {
        Self {
            base_url: AFTERMATH_API_BASE.to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WalletCfg {
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub coin_type: String,
}

impl From<TokenInfo> for Token {
    fn from(info: TokenInfo) -> Self {
        Token::new(info.symbol, info.coin_type)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenCfg {
    pub from: TokenInfo,
    pub to: TokenInfo,
}

impl Default for TokenCfg {
    fn default() -> Self {
        let pair = TokenPair::default();
        Self {
            from: TokenInfo {
                symbol: pair.from.symbol,
                coin_type: pair.from.coin_type,
            },
            to: TokenInfo {
                symbol: pair.to.symbol,
                coin_type: pair.to.coin_type,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormCfg {
    pub default_slippage: Decimal,
    pub price_refresh_secs: u64,
    pub toast_timeout_ms: u64,
    pub wallet_detect_retry_ms: u64,
    pub effect_timeout_ms: u64,
}

impl Default for FormCfg {
    fn default() -> Self {
        Self {
            default_slippage: DEFAULT_SLIPPAGE,
            price_refresh_secs: 10,
            toast_timeout_ms: 4000,
            wallet_detect_retry_ms: 1000,
            effect_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcCfg,
    pub aggregator: AggregatorCfg,
    pub wallet: WalletCfg,
    pub tokens: TokenCfg,
    pub form: FormCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        Self::parse(&s)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse config TOML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        let slippage = self.form.default_slippage;
        if slippage < Decimal::ZERO || slippage > Decimal::ONE_HUNDRED {
            anyhow::bail!("form.default_slippage must be within [0, 100], got {}", slippage);
        }
        if self.tokens.from.coin_type == self.tokens.to.coin_type {
            anyhow::bail!("tokens.from and tokens.to must be different coins");
        }
        Ok(())
    }
}
