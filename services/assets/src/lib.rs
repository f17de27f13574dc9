//! Asset tracking service
//!
//! Realized-gain lot accounting over an asset's linked transaction
//! history, and a staleness-cached spot price feed.

pub mod gains;
pub mod links;
pub mod pricefeed;

pub use gains::{calculate_gain, GainError, GainStrategy};
pub use links::{chronological_pairs, gain_for_asset};
pub use pricefeed::{
    refresh_price, CoinGeckoSource, PriceSource, RefreshOutcome, COINGECKO_URL,
    DEFAULT_STALE_MINUTES,
};
