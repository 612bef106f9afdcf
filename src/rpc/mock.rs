//! In-memory RPC transport for tests
//!
//! Answers by method (and program id for token account queries), records
//! every call, and can delay answers per wallet address.

use super::types::{RpcError, RpcResult};
use super::RpcTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone)]
enum Reply {
    Result(Value),
    Error(RpcError),
}

#[derive(Default)]
pub struct MockTransport {
    replies: HashMap<String, Reply>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<(String, Value)>>,
}

fn reply_key(method: &str, params: &Value) -> String {
    match params.get(1).and_then(|p| p.get("programId")).and_then(Value::as_str) {
        Some(program) => format!("{}:{}", method, program),
        None => method.to_string(),
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, lamports: u64) -> Self {
        self.replies.insert(
            "getBalance".to_string(),
            Reply::Result(json!({"context": {"slot": 1}, "value": lamports})),
        );
        self
    }

    pub fn with_token_accounts(mut self, program_id: &str, accounts: Vec<Value>) -> Self {
        self.replies.insert(
            format!("getTokenAccountsByOwner:{}", program_id),
            Reply::Result(json!({"context": {"slot": 1}, "value": accounts})),
        );
        self
    }

    pub fn with_raw_result(mut self, key: &str, result: Value) -> Self {
        self.replies.insert(key.to_string(), Reply::Result(result));
        self
    }

    pub fn with_error(mut self, key: &str, error: RpcError) -> Self {
        self.replies.insert(key.to_string(), Reply::Error(error));
        self
    }

    /// Delay every answer for requests about `address`
    pub fn with_delay_for(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    /// `jsonParsed` token account entry as a real node returns it
    pub fn token_account(pubkey: &str, mint: &str, amount: u64, decimals: u8) -> Value {
        json!({
            "pubkey": pubkey,
            "account": {
                "data": {
                    "parsed": {
                        "info": {
                            "isNative": false,
                            "mint": mint,
                            "owner": "owner",
                            "state": "initialized",
                            "tokenAmount": {
                                "amount": amount.to_string(),
                                "decimals": decimals,
                                "uiAmount": (amount as f64) / 10f64.powi(decimals as i32),
                                "uiAmountString": "0"
                            }
                        },
                        "type": "account"
                    },
                    "program": "spl-token",
                    "space": 165
                },
                "executable": false,
                "lamports": 2039280,
                "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                "rentEpoch": 0
            }
        })
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }

    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(&self, method: &str, params: Value) -> RpcResult<Value> {
        self.calls.lock().push((method.to_string(), params.clone()));

        let address = params.get(0).and_then(Value::as_str).unwrap_or_default();
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }

        let key = reply_key(method, &params);
        let reply = self
            .replies
            .get(&key)
            .or_else(|| self.replies.get(method))
            .cloned();

        match reply {
            Some(Reply::Result(value)) => Ok(value),
            Some(Reply::Error(error)) => Err(error),
            None => Ok(json!({"context": {"slot": 1}, "value": []})),
        }
    }
}
