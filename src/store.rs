//! Holdings store - flat-file portfolio persistence
//!
//! The portfolio is a JSON array of holdings, rewritten in full on every
//! mutation. There is no transaction log and no partial update: the store
//! targets a single-user, single-process deployment, so load-modify-save
//! with last-writer-wins is the whole concurrency story.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config;
use crate::error::PortfolioError;

/// A single position: how many shares of a ticker were bought, and at what
/// cost-basis-weighted average price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: Decimal,
    pub buy_price: Decimal,
}

/// Normalize a ticker symbol: trim whitespace and uppercase.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Merge a new buy into an existing position using quantity-weighted
/// average cost:
///
/// `new_avg = (old_avg*old_shares + buy_price*shares) / (old_shares + shares)`
///
/// Returns `(total_shares, new_average_cost)`. This is the contract even
/// though some ad-hoc trackers simply overwrite the average on re-add;
/// overwriting discards the original cost basis and misstates P&L.
pub fn merge_buy(
    old_shares: Decimal,
    old_avg: Decimal,
    shares: Decimal,
    buy_price: Decimal,
) -> (Decimal, Decimal) {
    let total_shares = old_shares + shares;
    let new_avg = (old_avg * old_shares + buy_price * shares) / total_shares;
    (total_shares, new_avg)
}

/// Storage boundary for the portfolio.
///
/// `load`/`save` always move the full sequence; the trait exists so the
/// valuation engine and tests can run against an in-memory store instead
/// of the real file.
pub trait HoldingsStore {
    /// Load all holdings in store order. A store that does not exist yet
    /// initializes itself to empty and returns an empty sequence.
    fn load(&self) -> Result<Vec<Holding>>;

    /// Overwrite the store with the full sequence.
    fn save(&self, holdings: &[Holding]) -> Result<()>;
}

/// Production store: a single pretty-printed JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store at the default location (~/.findigest/portfolio.json)
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(config::default_store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(holdings: &[Holding]) -> Result<String> {
        let mut json = serde_json::to_string_pretty(holdings)
            .context("Failed to serialize portfolio to JSON")?;
        json.push('\n');
        Ok(json)
    }
}

impl HoldingsStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Holding>> {
        if !self.path.exists() {
            debug!("Portfolio file {:?} missing, initializing empty store", self.path);
            self.save(&[])?;
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read portfolio file {:?}", self.path))?;

        let holdings: Vec<Holding> = serde_json::from_str(&raw).map_err(|e| {
            PortfolioError::PersistenceError(format!(
                "portfolio file {:?} is not valid JSON: {}",
                self.path, e
            ))
        })?;

        Ok(holdings)
    }

    fn save(&self, holdings: &[Holding]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory {:?}", parent))?;
        }

        // Write to a sibling temp file, then rename over the target so a
        // crash mid-write never leaves a truncated portfolio behind.
        let tmp_path = self.path.with_extension("json.tmp");
        let json = Self::encode(holdings)?;

        std::fs::write(&tmp_path, &json)
            .with_context(|| format!("Failed to write portfolio file {:?}", tmp_path))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace portfolio file {:?}", self.path))?;

        debug!("Saved {} holdings to {:?}", holdings.len(), self.path);
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    holdings: Mutex<Vec<Holding>>,
}

impl MemoryStore {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self {
            holdings: Mutex::new(holdings),
        }
    }
}

impl HoldingsStore for MemoryStore {
    fn load(&self) -> Result<Vec<Holding>> {
        Ok(self.holdings.lock().unwrap().clone())
    }

    fn save(&self, holdings: &[Holding]) -> Result<()> {
        *self.holdings.lock().unwrap() = holdings.to_vec();
        Ok(())
    }
}

/// Add a holding, or merge into an existing one.
///
/// Ticker is normalized (trim + uppercase). Re-adding an existing ticker
/// accumulates shares and re-weights the average cost; it never creates a
/// duplicate record. Returns the updated sequence after persisting it.
pub fn add_holding(
    store: &dyn HoldingsStore,
    ticker: &str,
    shares: Decimal,
    buy_price: Decimal,
) -> Result<Vec<Holding>> {
    let ticker = normalize_ticker(ticker);

    if ticker.is_empty() {
        return Err(PortfolioError::ValidationError(
            "ticker symbol cannot be empty".to_string(),
        )
        .into());
    }
    if shares <= Decimal::ZERO {
        return Err(PortfolioError::ValidationError(
            "shares must be greater than zero".to_string(),
        )
        .into());
    }
    if buy_price <= Decimal::ZERO {
        return Err(PortfolioError::ValidationError(
            "buy price must be greater than zero".to_string(),
        )
        .into());
    }

    let mut holdings = store.load()?;

    if let Some(existing) = holdings.iter_mut().find(|h| h.ticker == ticker) {
        let (total_shares, new_avg) =
            merge_buy(existing.shares, existing.buy_price, shares, buy_price);
        existing.shares = total_shares;
        existing.buy_price = new_avg;
    } else {
        holdings.push(Holding {
            ticker,
            shares,
            buy_price,
        });
    }

    store.save(&holdings)?;
    Ok(holdings)
}

/// Remove a holding by ticker. Removing an absent ticker is a no-op.
pub fn remove_holding(store: &dyn HoldingsStore, ticker: &str) -> Result<Vec<Holding>> {
    let ticker = normalize_ticker(ticker);
    let mut holdings = store.load()?;
    holdings.retain(|h| h.ticker != ticker);
    store.save(&holdings)?;
    Ok(holdings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker("  aapl "), "AAPL");
        assert_eq!(normalize_ticker("msft"), "MSFT");
        assert_eq!(normalize_ticker("   "), "");
    }

    #[test]
    fn test_merge_buy_weighted_average() {
        // 10 @ 100, then 10 @ 200 -> 20 @ 150
        let (shares, avg) = merge_buy(dec!(10), dec!(100), dec!(10), dec!(200));
        assert_eq!(shares, dec!(20));
        assert_eq!(avg, dec!(150));

        // Uneven weights: 30 @ 10, then 10 @ 50 -> 40 @ 20
        let (shares, avg) = merge_buy(dec!(30), dec!(10), dec!(10), dec!(50));
        assert_eq!(shares, dec!(40));
        assert_eq!(avg, dec!(20));
    }

    #[test]
    fn test_merge_buy_fractional_shares() {
        let (shares, avg) = merge_buy(dec!(1.5), dec!(100), dec!(0.5), dec!(200));
        assert_eq!(shares, dec!(2));
        assert_eq!(avg, dec!(125));
    }

    #[test]
    fn test_add_holding_validations() {
        let store = MemoryStore::default();

        assert!(add_holding(&store, "  ", dec!(1), dec!(1)).is_err());
        assert!(add_holding(&store, "AAPL", dec!(0), dec!(1)).is_err());
        assert!(add_holding(&store, "AAPL", dec!(-5), dec!(1)).is_err());
        assert!(add_holding(&store, "AAPL", dec!(1), dec!(0)).is_err());

        // Failed validation must leave the store untouched
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_add_holding_normalizes_and_appends() {
        let store = MemoryStore::default();

        let holdings = add_holding(&store, " aapl ", dec!(10), dec!(150)).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "AAPL");
        assert_eq!(holdings[0].shares, dec!(10));
        assert_eq!(holdings[0].buy_price, dec!(150));
    }

    #[test]
    fn test_add_holding_merges_existing() {
        let store = MemoryStore::default();

        add_holding(&store, "AAPL", dec!(10), dec!(100)).unwrap();
        let holdings = add_holding(&store, "aapl", dec!(10), dec!(200)).unwrap();

        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].shares, dec!(20));
        assert_eq!(holdings[0].buy_price, dec!(150));
    }

    #[test]
    fn test_remove_holding_absent_is_noop() {
        let store = MemoryStore::default();
        add_holding(&store, "AAPL", dec!(10), dec!(100)).unwrap();

        let holdings = remove_holding(&store, "MSFT").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "AAPL");
    }

    #[test]
    fn test_remove_holding_deletes_record() {
        let store = MemoryStore::default();
        add_holding(&store, "AAPL", dec!(10), dec!(100)).unwrap();
        add_holding(&store, "MSFT", dec!(5), dec!(300)).unwrap();

        let holdings = remove_holding(&store, " aapl ").unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].ticker, "MSFT");
    }

    #[test]
    fn test_json_store_missing_file_self_heals() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("portfolio.json"));

        let holdings = store.load().unwrap();
        assert!(holdings.is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_json_store_roundtrip_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("portfolio.json"));

        add_holding(&store, "AAPL", dec!(10), dec!(150)).unwrap();

        store.save(&store.load().unwrap()).unwrap();
        let first = std::fs::read(store.path()).unwrap();
        store.save(&store.load().unwrap()).unwrap();
        let second = std::fs::read(store.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_store_rejects_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("portfolio.json");
        std::fs::write(&path, "{ not json ]").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_json_store_atomic_save_leaves_no_temp_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path().join("portfolio.json"));

        add_holding(&store, "AAPL", dec!(1), dec!(1)).unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
