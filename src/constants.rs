/// Global constants used across the balance aggregator
///
/// This module contains system-wide constants that are not configurable
/// and are used across multiple modules.

// ============================================================================
// SOLANA BLOCKCHAIN CONSTANTS
// ============================================================================

/// Native SOL representation (system program ID placeholder).
/// Used as the mint address of the native-coin holding.
pub const NATIVE_SOL_MINT: &str = "11111111111111111111111111111111";

/// Display ticker of the native coin
pub const SOL_SYMBOL: &str = "SOL";

/// Number of decimal places for SOL
pub const SOL_DECIMALS: u8 = 9;

/// Length in bytes of a decoded Solana public key
pub const PUBKEY_BYTES: usize = 32;

/// Common stablecoin mints
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

// ============================================================================
// UNKNOWN TOKEN FALLBACKS
// ============================================================================

/// Symbol reported for any mint missing from the known-mint table
pub const UNKNOWN_SYMBOL: &str = "???";

/// Decimals assumed for any mint missing from the known-mint table.
/// Balances of unknown tokens with a different mint configuration are misscaled.
pub const UNKNOWN_TOKEN_DECIMALS: u8 = 9;

// ============================================================================
// RPC CONSTANTS
// ============================================================================

/// Default public mainnet endpoint
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default bound on a single aggregation (both RPC queries)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 5;

/// Default interval between watcher refreshes
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 30;

/// Tolerance used when checking that allocations add up to 100%
pub const ALLOCATION_EPSILON: f64 = 1e-6;
