/// Token Balance Aggregator
///
/// The single place that turns a wallet address into holdings:
/// - Validates the address locally (no request for a bad address)
/// - Queries the SOL balance and the wallet's token accounts concurrently
/// - Labels tokens through the known-mint table, values them through the price table
/// - Computes allocation across the result set
///
/// A failed query fails the whole aggregation; a partial token list would
/// misstate the portfolio total. No retries happen here.
use super::holdings::{assign_allocations, total_value, WalletHolding};
use super::tokens::{KnownMints, PriceTable};
use crate::config::Config;
use crate::constants::UNKNOWN_TOKEN_DECIMALS;
use crate::errors::{AggregatorError, AggregatorResult};
use crate::logger::{self, LogTag};
use crate::rpc::{
    parse_pubkey_string, short_address, spl_token_program_id, token_2022_program_id,
    RpcClientMethods, RpcError, RpcResult, RpcTransport, TokenAccountInfo,
};
use crate::shutdown::CancellationSignal;
use std::sync::Arc;
use std::time::Duration;

/// Per-call knobs that are not lookup tables
#[derive(Debug, Clone, Copy)]
pub struct AggregateOptions {
    pub timeout: Duration,
    pub include_token_2022: bool,
}

impl From<&Config> for AggregateOptions {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.request_timeout(),
            include_token_2022: config.include_token_2022,
        }
    }
}

pub struct TokenBalanceAggregator {
    transport: Arc<dyn RpcTransport>,
    known_mints: KnownMints,
    prices: PriceTable,
    options: AggregateOptions,
}

impl TokenBalanceAggregator {
    /// Lookup tables and options come from `config`; the endpoint is the transport's
    pub fn with_transport(transport: Arc<dyn RpcTransport>, config: &Config) -> Self {
        Self {
            transport,
            known_mints: config.known_mints.clone(),
            prices: config.prices.clone(),
            options: AggregateOptions::from(config),
        }
    }

    pub fn known_mints(&self) -> &KnownMints {
        &self.known_mints
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Current holdings of `address`: SOL first, then token accounts in RPC order
    pub async fn aggregate(
        &self,
        address: &str,
        cancel: &CancellationSignal,
    ) -> AggregatorResult<Vec<WalletHolding>> {
        aggregate_with(
            self.transport.as_ref(),
            address,
            &self.known_mints,
            &self.prices,
            self.options,
            cancel,
        )
        .await
    }
}

/// Aggregation with every input explicit
pub async fn aggregate_with(
    transport: &dyn RpcTransport,
    address: &str,
    known_mints: &KnownMints,
    prices: &PriceTable,
    options: AggregateOptions,
    cancel: &CancellationSignal,
) -> AggregatorResult<Vec<WalletHolding>> {
    parse_pubkey_string(address).map_err(|reason| {
        logger::debug(
            LogTag::Wallet,
            &format!("Rejected wallet address '{}': {}", address, reason),
        );
        AggregatorError::invalid_address(address, reason)
    })?;

    if cancel.is_cancelled() {
        return Err(AggregatorError::Cancelled);
    }

    let fetch = tokio::time::timeout(
        options.timeout,
        fetch_wallet_accounts(transport, address, options.include_token_2022),
    );

    let (lamports, accounts) = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(AggregatorError::Cancelled),
        fetched = fetch => match fetched {
            Ok(result) => result?,
            Err(_) => {
                return Err(RpcError::Timeout {
                    after: options.timeout,
                }
                .into())
            }
        },
    };

    if cancel.is_cancelled() {
        return Err(AggregatorError::Cancelled);
    }

    let holdings = build_holdings(lamports, &accounts, known_mints, prices);

    logger::debug(
        LogTag::Wallet,
        &format!(
            "Aggregated {} holdings for {} ({} token accounts, total ${:.2})",
            holdings.len(),
            short_address(address),
            accounts.len(),
            total_value(&holdings)
        ),
    );

    Ok(holdings)
}

/// Native balance and token accounts, queried concurrently
async fn fetch_wallet_accounts(
    transport: &dyn RpcTransport,
    owner: &str,
    include_token_2022: bool,
) -> RpcResult<(u64, Vec<TokenAccountInfo>)> {
    let spl_program = spl_token_program_id();
    let token_2022_program = token_2022_program_id();

    let token_2022_accounts = async {
        if include_token_2022 {
            transport
                .get_token_accounts_by_owner(owner, &token_2022_program)
                .await
        } else {
            Ok(Vec::new())
        }
    };

    let (lamports, mut accounts, extra) = tokio::try_join!(
        transport.get_balance(owner),
        transport.get_token_accounts_by_owner(owner, &spl_program),
        token_2022_accounts
    )?;
    accounts.extend(extra);

    Ok((lamports, accounts))
}

/// Turn raw balances into valued, allocated holdings
///
/// Zero balances are dropped, native included; an empty wallet yields no holdings.
pub fn build_holdings(
    lamports: u64,
    accounts: &[TokenAccountInfo],
    known_mints: &KnownMints,
    prices: &PriceTable,
) -> Vec<WalletHolding> {
    let mut holdings = Vec::with_capacity(accounts.len() + 1);
    if lamports > 0 {
        holdings.push(WalletHolding::native(lamports, prices));
    }

    for account in accounts.iter().filter(|a| a.raw_amount > 0) {
        let holding = WalletHolding::from_token_account(account, known_mints, prices);
        if holding.is_unrecognized() && account.reported_decimals != UNKNOWN_TOKEN_DECIMALS {
            logger::debug(
                LogTag::Wallet,
                &format!(
                    "Unrecognized mint {} reports {} decimals; assuming {}",
                    account.mint, account.reported_decimals, UNKNOWN_TOKEN_DECIMALS
                ),
            );
        }
        holdings.push(holding);
    }

    assign_allocations(&mut holdings);
    holdings
}
