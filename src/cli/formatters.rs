//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::fundamentals::Fundamentals;
use crate::scraping::NewsItem;
use crate::store::Holding;
use crate::utils::{format_amount, format_currency};
use crate::valuation::{PortfolioSummary, ValuationRow};

/// Message shown when the store has no holdings
pub fn format_empty_portfolio() -> String {
    "No holdings found. Add one with: findigest add <ticker> <shares> <buy-price>".to_string()
}

/// Format the raw holdings list (no prices) for terminal output
pub fn format_holdings_table(holdings: &[Holding]) -> String {
    if holdings.is_empty() {
        return format_empty_portfolio();
    }

    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Shares")]
        shares: String,
        #[tabled(rename = "Avg Cost")]
        avg_cost: String,
    }

    let rows: Vec<HoldingRow> = holdings
        .iter()
        .map(|h| HoldingRow {
            ticker: h.ticker.clone(),
            shares: h.shares.to_string(),
            avg_cost: format_amount(h.buy_price),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format the raw holdings list as JSON
pub fn format_holdings_json(holdings: &[Holding]) -> String {
    serde_json::to_string_pretty(holdings)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a valuation report for terminal table output
pub fn format_valuation_table(rows: &[ValuationRow], summary: &PortfolioSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} Portfolio Valuation\n\n", "📊".cyan().bold()));

    if rows.is_empty() {
        output.push_str("No priced holdings. Holdings whose price lookup fails are skipped.\n");
    } else {
        #[derive(Tabled)]
        struct PositionRow {
            #[tabled(rename = "Ticker")]
            ticker: String,
            #[tabled(rename = "Shares")]
            shares: String,
            #[tabled(rename = "Avg Cost")]
            avg_cost: String,
            #[tabled(rename = "Price")]
            price: String,
            #[tabled(rename = "Value")]
            value: String,
            #[tabled(rename = "P&L")]
            pnl: String,
        }

        let table_rows: Vec<PositionRow> = rows
            .iter()
            .map(|r| PositionRow {
                ticker: r.ticker.clone(),
                shares: r.shares.to_string(),
                avg_cost: format_amount(r.buy_price),
                price: format_amount(r.current_price),
                value: format_amount(r.value),
                pnl: colorize_pnl(r.pnl),
            })
            .collect();

        let mut table = Table::new(&table_rows);
        table.with(Style::rounded());
        table.modify(Columns::new(1..), Alignment::right());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output.push_str(&format!(
        "\nTotal Value: {}\nTotal Cost:  {}\nNet P/L:     {}\n",
        format_currency(summary.total_value).bold(),
        format_currency(summary.total_cost),
        colorize_pnl(summary.net_pnl).bold()
    ));

    output
}

fn colorize_pnl(pnl: Decimal) -> String {
    let text = format_currency(pnl);
    if pnl < Decimal::ZERO {
        text.red().to_string()
    } else if pnl > Decimal::ZERO {
        text.green().to_string()
    } else {
        text
    }
}

/// Format a valuation report for JSON output
pub fn format_valuation_json(rows: &[ValuationRow], summary: &PortfolioSummary) -> String {
    #[derive(Serialize)]
    struct JsonRow {
        ticker: String,
        shares: String,
        buy_price: String,
        current_price: String,
        value: String,
        pnl: String,
    }

    #[derive(Serialize)]
    struct JsonSummary {
        total_value: String,
        total_cost: String,
        net_pnl: String,
    }

    #[derive(Serialize)]
    struct JsonReport {
        rows: Vec<JsonRow>,
        summary: JsonSummary,
    }

    let report = JsonReport {
        rows: rows
            .iter()
            .map(|r| JsonRow {
                ticker: r.ticker.clone(),
                shares: r.shares.to_string(),
                buy_price: r.buy_price.to_string(),
                current_price: r.current_price.to_string(),
                value: r.value.to_string(),
                pnl: r.pnl.to_string(),
            })
            .collect(),
        summary: JsonSummary {
            total_value: summary.total_value.to_string(),
            total_cost: summary.total_cost.to_string(),
            net_pnl: summary.net_pnl.to_string(),
        },
    };

    serde_json::to_string_pretty(&report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format news headlines for terminal output
pub fn format_news(ticker: &str, items: &[NewsItem]) -> String {
    if items.is_empty() {
        return format!("No recent headlines found for {}", ticker);
    }

    let mut output = format!("\n{} Recent headlines for {}\n\n", "📰".cyan(), ticker.bold());
    for item in items {
        output.push_str(&format!("  • {} ({})\n    {}\n", item.title, item.source, item.link));
    }
    output
}

/// Format a ticker research summary (fundamentals + AI prose + sentiment)
pub fn format_summary(
    ticker: &str,
    fundamentals: &Fundamentals,
    summary: &str,
    sentiment: &str,
) -> String {
    let mut output = format!("\n{} {}\n\n", "🔎".cyan(), ticker.bold());

    if !fundamentals.is_empty() {
        output.push_str(&fundamentals.to_lines());
        output.push_str("\n\n");
    }

    output.push_str(summary);
    output.push_str(&format!("\n\nSentiment: {}\n", sentiment));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_rows() -> (Vec<ValuationRow>, PortfolioSummary) {
        let rows = vec![ValuationRow {
            ticker: "AAPL".to_string(),
            shares: dec!(10),
            buy_price: dec!(150.00),
            current_price: dec!(200.00),
            value: dec!(2000.00),
            cost: dec!(1500.00),
            pnl: dec!(500.00),
        }];
        let summary = PortfolioSummary {
            total_value: dec!(2000.00),
            total_cost: dec!(1500.00),
            net_pnl: dec!(500.00),
        };
        (rows, summary)
    }

    #[test]
    fn test_valuation_table_contains_figures() {
        colored::control::set_override(false);
        let (rows, summary) = sample_rows();
        let output = format_valuation_table(&rows, &summary);

        assert!(output.contains("AAPL"));
        assert!(output.contains("2,000.00"));
        assert!(output.contains("$500.00"));
    }

    #[test]
    fn test_valuation_json_shape() {
        let (rows, summary) = sample_rows();
        let output = format_valuation_json(&rows, &summary);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["rows"][0]["ticker"], "AAPL");
        assert_eq!(parsed["summary"]["net_pnl"], "500.00");
    }

    #[test]
    fn test_empty_valuation_mentions_skip_policy() {
        let output = format_valuation_table(&[], &PortfolioSummary::zero());
        assert!(output.contains("skipped"));
        assert!(output.contains("$0.00"));
    }

    #[test]
    fn test_holdings_table_empty_message() {
        let output = format_holdings_table(&[]);
        assert!(output.contains("No holdings found"));
    }
}
