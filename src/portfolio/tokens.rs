//! Static token metadata: the known-mint table and the price table
//!
//! Both are plain lookups supplied through configuration. Prices are a
//! static table, not live market data.

use crate::constants::{USDC_MINT, USDT_MINT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMint {
    pub symbol: String,
    pub decimals: u8,
}

/// Mint address → symbol and decimals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnownMints(HashMap<String, KnownMint>);

impl KnownMints {
    pub fn new() -> Self {
        Self::default()
    }

    /// USDC and USDT, the stablecoins every deployment recognises
    pub fn with_stablecoins() -> Self {
        let mut mints = Self::new();
        mints.insert(USDC_MINT, "USDC", 6);
        mints.insert(USDT_MINT, "USDT", 6);
        mints
    }

    pub fn insert(&mut self, mint: &str, symbol: &str, decimals: u8) {
        self.0.insert(
            mint.to_string(),
            KnownMint {
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    pub fn get(&self, mint: &str) -> Option<&KnownMint> {
        self.0.get(mint)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &KnownMint)> {
        self.0.iter()
    }

    /// Merge `other` on top of `self`; entries in `other` win
    pub fn extend(&mut self, other: KnownMints) {
        self.0.extend(other.0);
    }

    /// Parse `SYMBOL:MINT:DECIMALS[,SYMBOL:MINT:DECIMALS...]`
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut mints = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [symbol, mint, decimals] = parts.as_slice() else {
                return Err(format!(
                    "known mint entry '{}' is not SYMBOL:MINT:DECIMALS",
                    entry
                ));
            };
            let decimals = decimals
                .parse::<u8>()
                .map_err(|e| format!("known mint entry '{}' has bad decimals: {}", entry, e))?;
            mints.insert(mint, symbol, decimals);
        }
        Ok(mints)
    }
}

/// Symbol → unit price in USD
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable(HashMap<String, f64>);

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stablecoins pegged at 1.0
    pub fn with_stablecoins() -> Self {
        let mut prices = Self::new();
        prices.insert("USDC", 1.0);
        prices.insert("USDT", 1.0);
        prices
    }

    pub fn insert(&mut self, symbol: &str, price: f64) {
        self.0.insert(symbol.to_string(), price);
    }

    /// Unit price for `symbol`; missing symbols are worth 0
    pub fn price_of(&self, symbol: &str) -> f64 {
        self.0.get(symbol).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: PriceTable) {
        self.0.extend(other.0);
    }

    /// Parse `SYMBOL:PRICE[,SYMBOL:PRICE...]`
    pub fn parse_list(list: &str) -> Result<Self, String> {
        let mut prices = Self::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (symbol, price) = entry
                .split_once(':')
                .ok_or_else(|| format!("price entry '{}' is not SYMBOL:PRICE", entry))?;
            let price = price
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("price entry '{}' has bad price: {}", entry, e))?;
            prices.insert(symbol.trim(), price);
        }
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_mint_list() {
        let mints = KnownMints::parse_list(
            "DEFAI:5Xm8Vh1nXZ8GqkuMGvRCXU3gyeRx7Kzo6iNaPfvXv6Pk:6, USDC:EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v:6",
        )
        .unwrap();

        assert_eq!(mints.len(), 2);
        let defai = mints.get("5Xm8Vh1nXZ8GqkuMGvRCXU3gyeRx7Kzo6iNaPfvXv6Pk").unwrap();
        assert_eq!(defai.symbol, "DEFAI");
        assert_eq!(defai.decimals, 6);
    }

    #[test]
    fn rejects_malformed_mint_entries() {
        assert!(KnownMints::parse_list("DEFAI:mint").is_err());
        assert!(KnownMints::parse_list("DEFAI:mint:nine").is_err());
        assert!(KnownMints::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn missing_price_is_zero() {
        let prices = PriceTable::parse_list("SOL:20.0,DEFAI:0.25").unwrap();
        assert_eq!(prices.price_of("SOL"), 20.0);
        assert_eq!(prices.price_of("DEFAI"), 0.25);
        assert_eq!(prices.price_of("BONK"), 0.0);
        assert!(!prices.contains("BONK"));
    }

    #[test]
    fn rejects_malformed_price_entries() {
        assert!(PriceTable::parse_list("SOL").is_err());
        assert!(PriceTable::parse_list("SOL:cheap").is_err());
    }

    #[test]
    fn later_tables_override_earlier_ones() {
        let mut prices = PriceTable::with_stablecoins();
        prices.extend(PriceTable::parse_list("USDC:0.99").unwrap());
        assert_eq!(prices.price_of("USDC"), 0.99);
        assert_eq!(prices.price_of("USDT"), 1.0);
    }
}
