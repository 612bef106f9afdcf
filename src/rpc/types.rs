//! JSON-RPC 2.0 wire types and RPC error taxonomy

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const JSONRPC_VERSION: &str = "2.0";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("Request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP {status} from RPC endpoint: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The endpoint answered with a JSON-RPC `error` object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

pub type RpcResult<T> = Result<T, RpcError>;

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// Reduce the envelope to its `result`, mapping `error` payloads
    pub fn into_result(self) -> RpcResult<Value> {
        if let Some(error) = self.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| RpcError::InvalidResponse("response has neither result nor error".to_string()))
    }
}

// =============================================================================
// RESULT PAYLOADS
// =============================================================================

/// `{ "context": {...}, "value": T }` wrapper used by most account queries
#[derive(Debug, Clone, Deserialize)]
pub struct RpcContextValue<T> {
    pub value: T,
}

/// One entry of a `getTokenAccountsByOwner` response with `jsonParsed` encoding
#[derive(Debug, Clone, Deserialize)]
pub struct KeyedParsedAccount {
    pub pubkey: String,
    pub account: ParsedAccount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccount {
    pub data: ParsedAccountData,
    #[serde(default)]
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccountData {
    pub parsed: ParsedTokenAccount,
    #[serde(default)]
    pub program: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedTokenAccount {
    pub info: TokenAccountParsedInfo,
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenAccountParsedInfo {
    pub mint: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(rename = "tokenAmount")]
    pub token_amount: UiTokenAmount,
}

/// Token amount with UI representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(rename = "uiAmount", default)]
    pub ui_amount: Option<f64>,
    #[serde(rename = "uiAmountString", default)]
    pub ui_amount_string: Option<String>,
}

/// Token account as used by the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccountInfo {
    pub account: String,
    pub mint: String,
    pub raw_amount: u64,
    /// Decimals the RPC reported for the mint
    pub reported_decimals: u8,
    pub is_token_2022: bool,
}

impl KeyedParsedAccount {
    pub fn into_token_account(self, is_token_2022: bool) -> RpcResult<TokenAccountInfo> {
        let info = self.account.data.parsed.info;
        let raw_amount = info.token_amount.amount.parse::<u64>().map_err(|e| {
            RpcError::InvalidResponse(format!(
                "token account {} has non-integer amount '{}': {}",
                self.pubkey, info.token_amount.amount, e
            ))
        })?;

        Ok(TokenAccountInfo {
            account: self.pubkey,
            mint: info.mint,
            raw_amount,
            reported_decimals: info.token_amount.decimals,
            is_token_2022,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_jsonrpc_envelope() {
        let request = RpcRequest::new(7, "getBalance", json!(["wallet"]));
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(
            encoded,
            json!({"jsonrpc": "2.0", "id": 7, "method": "getBalance", "params": ["wallet"]})
        );
    }

    #[test]
    fn error_payload_wins_over_result() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "Invalid param: WrongSize"}
        }))
        .unwrap();

        assert_eq!(
            response.into_result(),
            Err(RpcError::Rpc {
                code: -32602,
                message: "Invalid param: WrongSize".to_string()
            })
        );
    }

    #[test]
    fn empty_envelope_is_invalid() {
        let response: RpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(matches!(response.into_result(), Err(RpcError::InvalidResponse(_))));
    }

    #[test]
    fn parsed_account_converts_string_amount() {
        let keyed: KeyedParsedAccount = serde_json::from_value(json!({
            "pubkey": "AccountPubkey1111",
            "account": {
                "data": {
                    "parsed": {
                        "info": {
                            "mint": "MintPubkey1111",
                            "owner": "Owner1111",
                            "tokenAmount": {
                                "amount": "100000000",
                                "decimals": 6,
                                "uiAmount": 100.0,
                                "uiAmountString": "100"
                            }
                        },
                        "type": "account"
                    },
                    "program": "spl-token",
                    "space": 165
                },
                "executable": false,
                "lamports": 2039280,
                "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
            }
        }))
        .unwrap();

        let info = keyed.into_token_account(false).unwrap();
        assert_eq!(info.raw_amount, 100_000_000);
        assert_eq!(info.reported_decimals, 6);
        assert_eq!(info.mint, "MintPubkey1111");
        assert!(!info.is_token_2022);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        let keyed: KeyedParsedAccount = serde_json::from_value(json!({
            "pubkey": "Acc",
            "account": {"data": {"parsed": {"info": {
                "mint": "Mint",
                "tokenAmount": {"amount": "1.5", "decimals": 0}
            }}}}
        }))
        .unwrap();

        assert!(matches!(
            keyed.into_token_account(false),
            Err(RpcError::InvalidResponse(_))
        ));
    }
}
