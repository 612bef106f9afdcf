/// Error types for wallet balance aggregation
///
/// `AggregatorError` is what callers of the aggregator see. Transport and
/// JSON failures arrive as `RpcError` and are folded into `RpcUnavailable`.
use crate::rpc::RpcError;
use thiserror::Error;

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Error, Debug)]
pub enum AggregatorError {
    /// Address failed local validation; no request was sent
    #[error("Invalid wallet address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Any RPC failure; the aggregation produced no holdings at all
    #[error("RPC unavailable: {0}")]
    RpcUnavailable(#[from] RpcError),

    /// The caller's cancellation signal fired before the result was ready
    #[error("Aggregation cancelled")]
    Cancelled,
}

impl AggregatorError {
    pub fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        AggregatorError::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    /// A corrected address can fix this without touching the network
    pub fn is_invalid_address(&self) -> bool {
        matches!(self, AggregatorError::InvalidAddress { .. })
    }

    pub fn is_rpc_unavailable(&self) -> bool {
        matches!(self, AggregatorError::RpcUnavailable(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AggregatorError::Cancelled)
    }
}

pub type AggregatorResult<T> = Result<T, AggregatorError>;
