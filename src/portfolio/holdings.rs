//! Wallet holding records and their valuation
//!
//! value = (raw_amount / 10^decimals) * unit_price
//! allocation = value / Σ value * 100, or 0 for every holding when Σ value is 0

use super::tokens::{KnownMints, PriceTable};
use crate::constants::{
    NATIVE_SOL_MINT, SOL_DECIMALS, SOL_SYMBOL, UNKNOWN_SYMBOL, UNKNOWN_TOKEN_DECIMALS,
};
use crate::rpc::{short_address, TokenAccountInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a holding's symbol and decimals were resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingClass {
    Native,
    Known,
    /// Mint missing from the known-mint table: placeholder symbol, default
    /// decimals, zero price. Degraded, not an error.
    Unrecognized,
}

/// One token's position in a wallet at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletHolding {
    pub symbol: String,
    pub mint_address: String,
    /// Token account holding the balance; None for the native coin
    pub token_account: Option<String>,
    pub raw_amount: u64,
    pub decimals: u8,
    /// raw_amount scaled by decimals
    pub amount: f64,
    pub unit_price: f64,
    pub value: f64,
    pub allocation_percent: f64,
    pub class: HoldingClass,
}

/// Convert a smallest-unit amount into a human-readable quantity
pub fn scale_amount(raw_amount: u64, decimals: u8) -> f64 {
    (raw_amount as f64) / 10f64.powi(decimals as i32)
}

impl WalletHolding {
    fn priced(
        symbol: String,
        mint_address: String,
        token_account: Option<String>,
        raw_amount: u64,
        decimals: u8,
        unit_price: f64,
        class: HoldingClass,
    ) -> Self {
        let amount = scale_amount(raw_amount, decimals);
        Self {
            symbol,
            mint_address,
            token_account,
            raw_amount,
            decimals,
            amount,
            unit_price,
            value: amount * unit_price,
            allocation_percent: 0.0,
            class,
        }
    }

    /// Native SOL balance
    pub fn native(lamports: u64, prices: &PriceTable) -> Self {
        Self::priced(
            SOL_SYMBOL.to_string(),
            NATIVE_SOL_MINT.to_string(),
            None,
            lamports,
            SOL_DECIMALS,
            prices.price_of(SOL_SYMBOL),
            HoldingClass::Native,
        )
    }

    /// Token account, labelled through the known-mint table
    pub fn from_token_account(
        account: &TokenAccountInfo,
        known_mints: &KnownMints,
        prices: &PriceTable,
    ) -> Self {
        match known_mints.get(&account.mint) {
            Some(known) => Self::priced(
                known.symbol.clone(),
                account.mint.clone(),
                Some(account.account.clone()),
                account.raw_amount,
                known.decimals,
                prices.price_of(&known.symbol),
                HoldingClass::Known,
            ),
            None => Self::priced(
                UNKNOWN_SYMBOL.to_string(),
                account.mint.clone(),
                Some(account.account.clone()),
                account.raw_amount,
                UNKNOWN_TOKEN_DECIMALS,
                0.0,
                HoldingClass::Unrecognized,
            ),
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        self.class == HoldingClass::Unrecognized
    }

    /// Display label; unrecognized tokens carry their truncated mint
    pub fn label(&self) -> String {
        match self.class {
            HoldingClass::Unrecognized => {
                format!("{} ({})", self.symbol, short_address(&self.mint_address))
            }
            _ => self.symbol.clone(),
        }
    }
}

pub fn total_value(holdings: &[WalletHolding]) -> f64 {
    holdings.iter().map(|h| h.value).sum()
}

/// Fill in allocation_percent relative to this result set
pub fn assign_allocations(holdings: &mut [WalletHolding]) {
    let total = total_value(holdings);
    for holding in holdings.iter_mut() {
        holding.allocation_percent = if total > 0.0 {
            holding.value / total * 100.0
        } else {
            0.0
        };
    }
}

/// Holdings of one wallet with the time they were fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsSnapshot {
    pub wallet: String,
    pub holdings: Vec<WalletHolding>,
    pub total_value: f64,
    pub fetched_at: DateTime<Utc>,
}

impl HoldingsSnapshot {
    pub fn new(wallet: &str, holdings: Vec<WalletHolding>) -> Self {
        Self {
            wallet: wallet.to_string(),
            total_value: total_value(&holdings),
            holdings,
            fetched_at: Utc::now(),
        }
    }
}
