//! Suiswap - Sui token swap form
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::SwapFormService;
pub use domain::swap::{FormView, SwapForm};
pub use infrastructure::{AftermathClient, ConfiguredWallet, SuiRpcClient};
pub use shared::errors::{FormError, ServiceError};
