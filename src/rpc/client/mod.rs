//! HTTP JSON-RPC client
//!
//! Sends JSON-RPC 2.0 requests over HTTPS POST to a single endpoint and maps
//! every transport, status and JSON failure into `RpcError`.

mod methods;

pub use methods::{spl_token_program_id, token_2022_program_id, RpcClientMethods};

use super::stats::RpcStats;
use super::types::{RpcError, RpcRequest, RpcResponse, RpcResult};
use super::utils::mask_url;
use super::RpcTransport;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Longest response body kept in an HttpStatus error
const ERROR_BODY_LIMIT: usize = 256;

pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    timeout: Duration,
    next_id: AtomicU64,
    stats: Mutex<RpcStats>,
}

impl HttpRpcClient {
    pub fn new(url: &str, timeout: Duration) -> RpcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::ConfigurationError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.to_string(),
            http,
            timeout,
            next_id: AtomicU64::new(1),
            stats: Mutex::new(RpcStats::default()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Snapshot of call statistics since the client was created
    pub fn stats(&self) -> RpcStats {
        self.stats.lock().clone()
    }

    fn map_send_error(&self, error: reqwest::Error) -> RpcError {
        if error.is_timeout() {
            RpcError::Timeout {
                after: self.timeout,
            }
        } else {
            RpcError::ConnectionFailed(error.to_string())
        }
    }

    async fn post(&self, request: &RpcRequest<'_>) -> RpcResult<Value> {
        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let mut body = body;
            body.truncate(
                body.char_indices()
                    .nth(ERROR_BODY_LIMIT)
                    .map(|(i, _)| i)
                    .unwrap_or(body.len()),
            );
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        logger::verbose(
            LogTag::Rpc,
            &format!("{} #{} response: {}", request.method, request.id, body),
        );

        let envelope: RpcResponse = serde_json::from_str(&body)
            .map_err(|e| RpcError::InvalidResponse(format!("malformed JSON: {}", e)))?;
        envelope.into_result()
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, method: &str, params: Value) -> RpcResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        logger::debug(
            LogTag::Rpc,
            &format!("→ {} #{} to {}", method, id, mask_url(&self.url)),
        );

        let started = Instant::now();
        let result = self.post(&request).await;
        let elapsed = started.elapsed();
        self.stats.lock().record_call(method, elapsed, result.is_ok());

        match &result {
            Ok(_) => logger::debug(
                LogTag::Rpc,
                &format!("← {} #{} ok in {}ms", method, id, elapsed.as_millis()),
            ),
            Err(e) => logger::warning(
                LogTag::Rpc,
                &format!("{} #{} failed after {}ms: {}", method, id, elapsed.as_millis(), e),
            ),
        }

        result
    }
}
