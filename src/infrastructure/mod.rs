//! Infrastructure layer - HTTP clients for the chain, the aggregator and the wallet

pub mod aftermath;
pub mod http;
pub mod sui;
pub mod wallet;

pub use aftermath::AftermathClient;
pub use sui::SuiRpcClient;
pub use wallet::ConfiguredWallet;
