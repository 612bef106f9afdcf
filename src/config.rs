use crate::constants::{DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_RPC_URL};
use crate::logger::{self, LogTag};
use crate::portfolio::{KnownMints, PriceTable};
use crate::rpc::{mask_url, parse_pubkey_string};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const ENV_RPC_URL: &str = "DEFAI_RPC_URL";
pub const ENV_KNOWN_MINTS: &str = "DEFAI_KNOWN_MINTS";
pub const ENV_PRICES: &str = "DEFAI_PRICES";
pub const ENV_RPC_TIMEOUT_SECS: &str = "DEFAI_RPC_TIMEOUT_SECS";
pub const ENV_INCLUDE_TOKEN_2022: &str = "DEFAI_INCLUDE_TOKEN_2022";

fn default_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT_SECS
}

/// Everything the aggregator needs, passed in explicitly at construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub rpc_url: String,
    #[serde(default = "KnownMints::with_stablecoins")]
    pub known_mints: KnownMints,
    #[serde(default = "PriceTable::with_stablecoins")]
    pub prices: PriceTable,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Also list Token-2022 accounts (after the SPL Token ones)
    #[serde(default)]
    pub include_token_2022: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            known_mints: KnownMints::with_stablecoins(),
            prices: PriceTable::with_stablecoins(),
            request_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            include_token_2022: false,
        }
    }
}

impl Config {
    /// Load a JSON config file, writing the defaults first if it does not exist
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            let default_config = Self::default();
            default_config.save(path)?;
            logger::info(
                LogTag::Config,
                &format!("Wrote default configuration to {}", path),
            );
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path))?;
        config.log_summary(path);
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content).with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Read `DEFAI_*` variables, loading a `.env` file first when present
    pub fn from_env() -> Result<Self> {
        #[cfg(feature = "env-file")]
        {
            if let Ok(path) = dotenv::dotenv() {
                logger::debug(
                    LogTag::Config,
                    &format!("Loaded environment from {}", path.display()),
                );
            }
        }

        let config = Self::from_vars(|key| std::env::var(key).ok())?;
        config.log_summary("environment");
        Ok(config)
    }

    /// Build a config from a variable lookup; `from_env` passes the process env
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup(ENV_RPC_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} is not set", ENV_RPC_URL))?;

        let mut config = Self {
            rpc_url: rpc_url.trim().to_string(),
            ..Self::default()
        };

        if let Some(list) = lookup(ENV_KNOWN_MINTS) {
            let mints = KnownMints::parse_list(&list)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Failed to parse {}", ENV_KNOWN_MINTS))?;
            config.known_mints.extend(mints);
        }

        if let Some(list) = lookup(ENV_PRICES) {
            let prices = PriceTable::parse_list(&list)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Failed to parse {}", ENV_PRICES))?;
            config.prices.extend(prices);
        }

        if let Some(secs) = lookup(ENV_RPC_TIMEOUT_SECS) {
            config.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Failed to parse {}", ENV_RPC_TIMEOUT_SECS))?;
        }

        if let Some(flag) = lookup(ENV_INCLUDE_TOKEN_2022) {
            config.include_token_2022 = matches!(
                flag.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.rpc_url.starts_with("https://") || self.rpc_url.starts_with("http://")) {
            bail!("rpc_url must be an http(s) URL, got '{}'", mask_url(&self.rpc_url));
        }

        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }

        for (mint, known) in self.known_mints.iter() {
            parse_pubkey_string(mint)
                .map_err(|e| anyhow!("known mint {} ({}): {}", mint, known.symbol, e))?;
            if known.symbol.trim().is_empty() {
                bail!("known mint {} has an empty symbol", mint);
            }
        }

        for (symbol, price) in self.prices.iter() {
            if !price.is_finite() || *price < 0.0 {
                bail!("price for {} must be a finite non-negative number, got {}", symbol, price);
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn log_summary(&self, source: &str) {
        logger::debug(
            LogTag::Config,
            &format!(
                "Config from {}: rpc={} known_mints={} prices={} timeout={}s token_2022={}",
                source,
                mask_url(&self.rpc_url),
                self.known_mints.len(),
                self.prices.iter().count(),
                self.request_timeout_secs,
                self.include_token_2022
            ),
        );
    }
}
