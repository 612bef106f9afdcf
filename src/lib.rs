//! Wallet balance aggregation for the DeFAI rewards dashboard
//!
//! Turns a Solana wallet address into a list of valued holdings (native SOL
//! plus SPL token accounts) using a JSON-RPC node, a known-mint table and a
//! price table supplied through [`config::Config`].

pub mod arguments;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logger;
pub mod portfolio;
pub mod rpc;
pub mod shutdown;
