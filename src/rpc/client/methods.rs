//! Typed RPC methods on top of any `RpcTransport`
//!
//! Only the two read methods the aggregator needs: `getBalance` and
//! `getTokenAccountsByOwner` with `jsonParsed` encoding, so mint and raw
//! amount come back decoded.

use crate::rpc::types::{KeyedParsedAccount, RpcContextValue, RpcError, RpcResult, TokenAccountInfo};
use crate::rpc::RpcTransport;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// SPL Token program id
pub fn spl_token_program_id() -> String {
    spl_token::id().to_string()
}

/// Token-2022 program id
pub fn token_2022_program_id() -> String {
    spl_token_2022::id().to_string()
}

fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> RpcResult<T> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::InvalidResponse(format!("unexpected {} result: {}", method, e)))
}

/// Trait providing the RPC client methods used for balance aggregation
#[async_trait]
pub trait RpcClientMethods {
    /// Native balance in lamports
    async fn get_balance(&self, address: &str) -> RpcResult<u64>;

    /// Token accounts owned by `owner` under one token program, in RPC order
    async fn get_token_accounts_by_owner(
        &self,
        owner: &str,
        program_id: &str,
    ) -> RpcResult<Vec<TokenAccountInfo>>;
}

#[async_trait]
impl<T> RpcClientMethods for T
where
    T: RpcTransport + ?Sized,
{
    async fn get_balance(&self, address: &str) -> RpcResult<u64> {
        let result = self.send("getBalance", json!([address])).await?;
        let balance: RpcContextValue<u64> = decode_result("getBalance", result)?;
        Ok(balance.value)
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &str,
        program_id: &str,
    ) -> RpcResult<Vec<TokenAccountInfo>> {
        let params = json!([
            owner,
            { "programId": program_id },
            { "encoding": "jsonParsed" }
        ]);
        let result = self.send("getTokenAccountsByOwner", params).await?;
        let accounts: RpcContextValue<Vec<KeyedParsedAccount>> =
            decode_result("getTokenAccountsByOwner", result)?;

        let is_token_2022 = program_id == token_2022_program_id();
        accounts
            .value
            .into_iter()
            .map(|account| account.into_token_account(is_token_2022))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockTransport;

    #[test]
    fn program_ids_match_known_values() {
        assert_eq!(spl_token_program_id(), "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
        assert_eq!(token_2022_program_id(), "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
    }

    #[tokio::test]
    async fn get_balance_reads_context_value() {
        let mock = MockTransport::new().with_balance(2_500_000_000);
        assert_eq!(mock.get_balance("wallet").await.unwrap(), 2_500_000_000);
        assert_eq!(mock.calls_for("getBalance"), 1);
    }

    #[tokio::test]
    async fn token_accounts_request_json_parsed_encoding() {
        let mock = MockTransport::new().with_token_accounts(
            &spl_token_program_id(),
            vec![MockTransport::token_account("Acc1", "Mint1", 500, 6)],
        );

        let accounts = mock
            .get_token_accounts_by_owner("wallet", &spl_token_program_id())
            .await
            .unwrap();

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].raw_amount, 500);
        let params = mock.last_params("getTokenAccountsByOwner").unwrap();
        assert_eq!(params[2]["encoding"], "jsonParsed");
        assert_eq!(params[1]["programId"], spl_token_program_id());
    }

    #[tokio::test]
    async fn unexpected_result_shape_is_invalid_response() {
        let mock = MockTransport::new().with_raw_result("getBalance", json!({"value": "lots"}));
        assert!(matches!(
            mock.get_balance("wallet").await,
            Err(RpcError::InvalidResponse(_))
        ));
    }
}
