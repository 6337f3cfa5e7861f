//! Valuation engine - combines stored holdings with live prices
//!
//! Holdings are processed strictly in store order, one blocking lookup at
//! a time. A holding whose price lookup fails or comes back empty is
//! skipped entirely: it contributes neither a row nor anything to the
//! totals. Treating missing data as zero would corrupt the P&L, so the
//! engine leaves it out and logs the skip instead.
//!
//! The flip side of that policy is silent degradation: a portfolio whose
//! lookups all fail valuates to an empty row list and a zero summary, not
//! an error. Callers that need to tell "empty portfolio" from "oracle
//! down" must check the row count against the store.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::warn;

use crate::pricing::PriceSource;
use crate::store::{normalize_ticker, HoldingsStore};

/// Per-holding valuation snapshot. All money fields are rounded to 2
/// decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRow {
    pub ticker: String,
    pub shares: Decimal,
    pub buy_price: Decimal,
    pub current_price: Decimal,
    pub value: Decimal,
    pub cost: Decimal,
    pub pnl: Decimal,
}

/// Aggregate totals across all successfully priced holdings, rounded to 2
/// decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSummary {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub net_pnl: Decimal,
}

impl PortfolioSummary {
    pub fn zero() -> Self {
        Self {
            total_value: Decimal::ZERO.round_dp(2),
            total_cost: Decimal::ZERO.round_dp(2),
            net_pnl: Decimal::ZERO.round_dp(2),
        }
    }
}

/// Calculate the current value and unrealized P&L of every holding.
///
/// Per-ticker lookup failures are recovered locally by skipping the row;
/// they are never propagated. Only a store read/write failure aborts the
/// computation.
pub async fn calculate_portfolio_value(
    store: &dyn HoldingsStore,
    source: &dyn PriceSource,
) -> Result<(Vec<ValuationRow>, PortfolioSummary)> {
    let holdings = store.load()?;

    let mut rows = Vec::new();
    let mut total_value = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for holding in &holdings {
        // The store normalizes on add, but the file is hand-editable
        let ticker = normalize_ticker(&holding.ticker);
        if ticker.is_empty() {
            warn!("Skipping empty ticker entry in portfolio store");
            continue;
        }

        let price = match source.latest_price(&ticker).await {
            Ok(Some(price)) => price,
            Ok(None) => {
                warn!("No recent price data for {}, skipping", ticker);
                continue;
            }
            Err(e) => {
                warn!("Price lookup failed for {}: {}, skipping", ticker, e);
                continue;
            }
        };

        let value = price * holding.shares;
        let cost = holding.buy_price * holding.shares;
        let pnl = value - cost;

        rows.push(ValuationRow {
            ticker,
            shares: holding.shares,
            buy_price: holding.buy_price.round_dp(2),
            current_price: price.round_dp(2),
            value: value.round_dp(2),
            cost: cost.round_dp(2),
            pnl: pnl.round_dp(2),
        });

        // Totals accumulate unrounded and are rounded once at the end
        total_value += value;
        total_cost += cost;
    }

    let summary = PortfolioSummary {
        total_value: total_value.round_dp(2),
        total_cost: total_cost.round_dp(2),
        net_pnl: (total_value - total_cost).round_dp(2),
    };

    Ok((rows, summary))
}
