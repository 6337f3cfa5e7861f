// Pricing module - price source trait and Yahoo Finance client

pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Boundary to the price oracle.
///
/// `Ok(None)` means the source answered but has no price for the ticker;
/// `Err` means the lookup itself failed. The valuation engine treats both
/// as "skip this holding", but keeping them distinct lets callers tell
/// no-data apart from an outage.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>>;
}

/// Global singleton price fetcher with 24-hour cache.
/// This ensures cache is shared across all calls within a process.
static GLOBAL_FETCHER: Lazy<PriceFetcher> = Lazy::new(PriceFetcher::new);

/// Price cache entry
#[derive(Debug, Clone)]
struct CacheEntry {
    price: Decimal,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Price fetcher with caching (24hr TTL)
pub struct PriceFetcher {
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
    cache_ttl_hours: i64,
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceFetcher {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl_hours: 24,
        }
    }

    /// Fetch current price with caching
    pub async fn fetch_price(&self, ticker: &str) -> Result<Option<Decimal>> {
        // Check cache first
        {
            let cache = self.cache.lock().unwrap();
            if let Some(entry) = cache.get(ticker) {
                let age = Utc::now().signed_duration_since(entry.timestamp);
                if age < Duration::hours(self.cache_ttl_hours) {
                    debug!(
                        "Using cached price for {} (age: {}h)",
                        ticker,
                        age.num_hours()
                    );
                    return Ok(Some(entry.price));
                }
            }
        }

        // Fetch from Yahoo Finance
        info!("Fetching fresh price for {} from Yahoo Finance", ticker);
        let client = yahoo::YahooClient::new()?;
        let Some(price_data) = client.fetch_current_price(ticker).await? else {
            return Ok(None);
        };

        // Cache the price
        let mut cache = self.cache.lock().unwrap();
        cache.insert(
            ticker.to_string(),
            CacheEntry {
                price: price_data.price,
                timestamp: Utc::now(),
            },
        );
        Ok(Some(price_data.price))
    }

    /// Clear cache
    #[allow(dead_code)]
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
        info!("Price cache cleared");
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        let cache = self.cache.lock().unwrap();
        cache.len()
    }
}

#[async_trait]
impl PriceSource for PriceFetcher {
    async fn latest_price(&self, ticker: &str) -> Result<Option<Decimal>> {
        self.fetch_price(ticker).await
    }
}

/// Price source that never has data. Used when price fetching is disabled
/// (`FINDIGEST_SKIP_PRICE_FETCH`), which makes every holding a logged skip.
pub struct OfflineSource;

#[async_trait]
impl PriceSource for OfflineSource {
    async fn latest_price(&self, _ticker: &str) -> Result<Option<Decimal>> {
        Ok(None)
    }
}

/// Convenience function to fetch a price using the global shared fetcher.
/// This uses a singleton cache that persists for the lifetime of the process.
pub async fn fetch_price(ticker: &str) -> Result<Option<Decimal>> {
    GLOBAL_FETCHER.fetch_price(ticker).await
}

/// Borrow the global shared fetcher as a `PriceSource`.
pub fn global_source() -> &'static PriceFetcher {
    &GLOBAL_FETCHER
}
