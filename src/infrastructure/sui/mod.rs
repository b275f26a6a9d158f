//! Sui fullnode access over JSON-RPC

mod rpc_client;

pub use rpc_client::{SuiRpcClient, SUI_MAINNET_RPC};
