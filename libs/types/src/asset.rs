//! Tracked asset types
//!
//! An asset is anything the family holds a position in and prices in the
//! ledger currency. Price observations are cached on the asset and kept as
//! a `PricePoint` history; `AssetTransactionLink` ties ledger transactions
//! to an asset with a signed quantity (positive acquires, negative
//! disposes), which is what realized-gain accounting consumes.

use crate::ids::{AssetId, FamilyId, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked asset within one family scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub family_id: FamilyId,
    pub name: String,
    /// Feed symbol, e.g. "bitcoin".
    pub symbol: String,
    /// Most recently fetched spot price, if any.
    pub current_price: Option<Decimal>,
    pub price_fetched_at: Option<DateTime<Utc>>,
}

impl Asset {
    pub fn new(
        family_id: FamilyId,
        name: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: AssetId::new(),
            family_id,
            name: name.into(),
            symbol: symbol.into(),
            current_price: None,
            price_fetched_at: None,
        }
    }
}

/// A historical price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub asset_id: AssetId,
    pub family_id: FamilyId,
    pub value: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Links a ledger transaction to an asset with a signed quantity.
///
/// The sign encodes direction: positive for an acquisition, negative for a
/// disposal. The linked transaction's amount is the per-lot price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetTransactionLink {
    pub asset_id: AssetId,
    pub family_id: FamilyId,
    pub transaction_id: TransactionId,
    pub quantity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_asset_has_no_cached_price() {
        let asset = Asset::new(FamilyId::new(), "Bitcoin", "bitcoin");
        assert!(asset.current_price.is_none());
        assert!(asset.price_fetched_at.is_none());
    }

    #[test]
    fn test_link_serialization_round_trip() {
        let link = AssetTransactionLink {
            asset_id: AssetId::new(),
            family_id: FamilyId::new(),
            transaction_id: TransactionId::new(),
            quantity: Decimal::from_str("-0.5").unwrap(),
        };
        let json = serde_json::to_string(&link).unwrap();
        let back: AssetTransactionLink = serde_json::from_str(&json).unwrap();
        assert_eq!(link, back);
    }
}
