//! Wallet holdings: lookup tables, valuation, aggregation and refresh

pub mod aggregator;
pub mod display;
pub mod holdings;
pub mod tokens;
pub mod watcher;


pub use aggregator::{aggregate_with, build_holdings, AggregateOptions, TokenBalanceAggregator};
pub use display::{format_summary, render_holdings_table, sorted_by_value};
pub use holdings::{
    assign_allocations, scale_amount, total_value, HoldingClass, HoldingsSnapshot, WalletHolding,
};
pub use tokens::{KnownMint, KnownMints, PriceTable};
pub use watcher::{HoldingsWatcher, RefreshOutcome};
