use super::holdings::{HoldingsSnapshot, WalletHolding};
use crate::rpc::short_address;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct HoldingRow {
    #[tabled(rename = "Token")]
    token: String,
    #[tabled(rename = "Mint")]
    mint: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Price (USD)")]
    price: String,
    #[tabled(rename = "Value (USD)")]
    value: String,
    #[tabled(rename = "Allocation")]
    allocation: String,
}

impl From<&WalletHolding> for HoldingRow {
    fn from(holding: &WalletHolding) -> Self {
        Self {
            token: holding.label(),
            mint: short_address(&holding.mint_address),
            amount: format_amount(holding.amount),
            price: format!("{:.4}", holding.unit_price),
            value: format!("{:.2}", holding.value),
            allocation: format!("{:.2}%", holding.allocation_percent),
        }
    }
}

fn format_amount(amount: f64) -> String {
    if amount != 0.0 && amount.abs() < 0.0001 {
        format!("{:.3e}", amount)
    } else {
        format!("{:.4}", amount)
    }
}

/// Holdings sorted by value, highest first; ties keep aggregation order
pub fn sorted_by_value(holdings: &[WalletHolding]) -> Vec<&WalletHolding> {
    let mut sorted: Vec<&WalletHolding> = holdings.iter().collect();
    sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
    sorted
}

/// Render a holdings table for the terminal
pub fn render_holdings_table(holdings: &[WalletHolding]) -> String {
    let rows: Vec<HoldingRow> = sorted_by_value(holdings)
        .into_iter()
        .map(HoldingRow::from)
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

/// One-line summary of a snapshot
pub fn format_summary(snapshot: &HoldingsSnapshot) -> String {
    let unrecognized = snapshot
        .holdings
        .iter()
        .filter(|h| h.is_unrecognized())
        .count();

    let mut summary = format!(
        "Wallet {}: {} holdings, total ${:.2} at {}",
        short_address(&snapshot.wallet),
        snapshot.holdings.len(),
        snapshot.total_value,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if unrecognized > 0 {
        summary.push_str(&format!(" ({} unrecognized, valued at 0)", unrecognized));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::{KnownMints, PriceTable};
    use crate::rpc::TokenAccountInfo;

    fn sample() -> Vec<WalletHolding> {
        let mut prices = PriceTable::new();
        prices.insert("SOL", 20.0);
        prices.insert("USDC", 1.0);
        let accounts = vec![
            TokenAccountInfo {
                account: "Acc1".to_string(),
                mint: crate::constants::USDC_MINT.to_string(),
                raw_amount: 75_000_000,
                reported_decimals: 6,
                is_token_2022: false,
            },
            TokenAccountInfo {
                account: "Acc2".to_string(),
                mint: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string(),
                raw_amount: 1000,
                reported_decimals: 0,
                is_token_2022: false,
            },
        ];
        crate::portfolio::build_holdings(
            2_500_000_000,
            &accounts,
            &KnownMints::with_stablecoins(),
            &prices,
        )
    }

    #[test]
    fn sorts_by_value_descending() {
        let holdings = sample();
        let sorted = sorted_by_value(&holdings);
        let symbols: Vec<&str> = sorted.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["USDC", "SOL", "???"]);
    }

    #[test]
    fn table_shows_labels_and_allocations() {
        let table = render_holdings_table(&sample());
        assert!(table.contains("USDC"));
        assert!(table.contains("??? (7xKX…gAsU)"));
        assert!(table.contains("60.00%"));
        assert!(table.contains("40.00%"));
        assert!(table.contains("Allocation"));
    }

    #[test]
    fn summary_mentions_unrecognized_tokens() {
        let snapshot = HoldingsSnapshot::new("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", sample());
        let summary = format_summary(&snapshot);
        assert!(summary.starts_with("Wallet 9WzD…AWWM: 3 holdings, total $125.00"));
        assert!(summary.ends_with("(1 unrecognized, valued at 0)"));
    }

    #[test]
    fn tiny_amounts_use_scientific_notation() {
        assert_eq!(format_amount(0.000001), "1.000e-6");
        assert_eq!(format_amount(0.0), "0.0000");
        assert_eq!(format_amount(2.5), "2.5000");
    }
}
