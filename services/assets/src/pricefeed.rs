//! Spot price feed with a staleness-windowed cache
//!
//! Prices come from a pluggable [`PriceSource`]; the CoinGecko-backed
//! implementation is the production one. Fetch failures are edge noise,
//! not errors: the refresh degrades to whatever cached value the asset
//! already carries.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};
use types::asset::{Asset, PricePoint};

/// CoinGecko simple-price endpoint.
pub const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Cached prices older than this are refetched.
pub const DEFAULT_STALE_MINUTES: i64 = 60;

/// Source of current USD spot prices.
pub trait PriceSource {
    /// Current USD price for a feed symbol, or None if unavailable.
    fn spot_usd(&self, symbol: &str) -> Option<Decimal>;
}

/// CoinGecko-backed price source (blocking HTTP, 10 s timeout).
pub struct CoinGeckoSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new() -> Self {
        Self::with_base_url(COINGECKO_URL)
    }

    /// Point the source at a different endpoint (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for CoinGeckoSource {
    fn spot_usd(&self, symbol: &str) -> Option<Decimal> {
        let symbol = symbol.to_lowercase();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ids", symbol.as_str()), ("vs_currencies", "usd")])
            .send()
            .ok()?
            .error_for_status()
            .ok()?;
        let body: serde_json::Value = response.json().ok()?;
        // Parse through the decimal string form, never through f64.
        match body.get(&symbol)?.get("usd")? {
            serde_json::Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
            serde_json::Value::String(s) => Decimal::from_str(s).ok(),
            _ => None,
        }
    }
}

/// Result of a cache refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    /// Best-known price after the refresh (fresh, newly fetched, or stale
    /// fallback). None only if there has never been a successful fetch.
    pub price: Option<Decimal>,
    /// History record to persist when a fetch actually happened.
    pub recorded: Option<PricePoint>,
}

/// Return the asset's price, refetching when the cache has gone stale.
///
/// A fresh cached value short-circuits unless `force` is set. On a fetch
/// failure the cached value (however old) is returned and nothing is
/// recorded.
pub fn refresh_price(
    asset: &mut Asset,
    source: &dyn PriceSource,
    now: DateTime<Utc>,
    stale_minutes: i64,
    force: bool,
) -> RefreshOutcome {
    if !force {
        if let (Some(price), Some(fetched_at)) = (asset.current_price, asset.price_fetched_at) {
            if now - fetched_at < Duration::minutes(stale_minutes) {
                debug!(symbol = %asset.symbol, "cached price still fresh");
                return RefreshOutcome {
                    price: Some(price),
                    recorded: None,
                };
            }
        }
    }

    match source.spot_usd(&asset.symbol) {
        Some(value) => {
            asset.current_price = Some(value);
            asset.price_fetched_at = Some(now);
            RefreshOutcome {
                price: Some(value),
                recorded: Some(PricePoint {
                    asset_id: asset.asset_id,
                    family_id: asset.family_id,
                    value,
                    timestamp: now,
                }),
            }
        }
        None => {
            warn!(symbol = %asset.symbol, "price fetch failed, keeping cached value");
            RefreshOutcome {
                price: asset.current_price,
                recorded: None,
            }
        }
    }
}
