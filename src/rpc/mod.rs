//! Solana JSON-RPC access
//!
//! `RpcTransport` is the seam between the aggregator and the network: the
//! HTTP client implements it for real endpoints and tests substitute a mock
//! that counts calls. Typed methods live in `RpcClientMethods`, implemented
//! for every transport.

pub mod client;
pub mod stats;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{spl_token_program_id, token_2022_program_id, HttpRpcClient, RpcClientMethods};
pub use stats::RpcStats;
pub use types::{RpcError, RpcResult, TokenAccountInfo};
pub use utils::{mask_url, parse_pubkey_string, short_address};

use async_trait::async_trait;
use serde_json::Value;

/// Sends one JSON-RPC request and returns its `result`
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn send(&self, method: &str, params: Value) -> RpcResult<Value>;
}
