//! Bid (buy-side) order book
//!
//! Buy orders keyed by price in a BTreeMap for deterministic iteration;
//! matching walks prices descending (highest bid first) with FIFO levels.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::{LevelEntry, PriceLevel};

/// Buy side of one asset's book.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Rest an order in the book.
    pub fn insert(&mut self, order: &Order) {
        self.levels
            .entry(order.price)
            .or_default()
            .push_back(LevelEntry {
                order_id: order.order_id,
                member_id: order.member_id,
                remaining: order.remaining,
                sequence: order.sequence,
            });
    }

    /// Remove a resting order. Returns true if it was found.
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Update a resting order's remaining quantity after a fill.
    ///
    /// The entry and any emptied level are dropped at zero.
    pub fn set_remaining(&mut self, order_id: &OrderId, price: Price, remaining: Quantity) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let found = level.set_remaining(order_id, remaining);
        if found && level.is_empty() {
            self.levels.remove(&price);
        }
        found
    }

    /// Levels an incoming sell at `limit` may execute against, best
    /// (highest) price first.
    pub fn matchable(&self, limit: Price) -> impl Iterator<Item = (&Price, &PriceLevel)> {
        self.levels.range(limit..).rev()
    }

    /// Best bid price and total quantity at it.
    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next_back()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Top `depth` levels, highest price first.
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{AssetId, FamilyId, MemberId};
    use types::order::Side;

    fn create_order(price: u64, qty: &str, sequence: u64) -> Order {
        let mut order = Order::new(
            FamilyId::new(),
            MemberId::new(),
            AssetId::new(),
            Side::Buy,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            1_754_000_000_000_000_000,
        )
        .unwrap();
        order.sequence = sequence;
        order
    }

    #[test]
    fn test_best_bid_is_highest_price() {
        let mut book = BidBook::new();
        book.insert(&create_order(50_000, "1.0", 1));
        book.insert(&create_order(51_000, "2.0", 2));
        book.insert(&create_order(49_000, "1.5", 3));

        let (price, qty) = book.best_bid().unwrap();
        assert_eq!(price, Price::from_u64(51_000));
        assert_eq!(qty, Quantity::from_str("2.0").unwrap());
    }

    #[test]
    fn test_matchable_descends_from_best() {
        let mut book = BidBook::new();
        book.insert(&create_order(50_000, "1.0", 1));
        book.insert(&create_order(51_000, "1.0", 2));
        book.insert(&create_order(49_000, "1.0", 3));

        // A sell at 49500 can hit 51000 and 50000 but not 49000.
        let prices: Vec<Price> = book
            .matchable(Price::from_str("49500").unwrap())
            .map(|(price, _)| *price)
            .collect();
        assert_eq!(prices, vec![Price::from_u64(51_000), Price::from_u64(50_000)]);
    }

    #[test]
    fn test_remove_drops_empty_level() {
        let mut book = BidBook::new();
        let order = create_order(50_000, "1.0", 1);
        book.insert(&order);

        assert!(book.remove(&order.order_id, order.price));
        assert!(book.is_empty());
        assert!(!book.remove(&order.order_id, order.price));
    }

    #[test]
    fn test_set_remaining_drops_level_at_zero() {
        let mut book = BidBook::new();
        let order = create_order(50_000, "1.0", 1);
        book.insert(&order);

        assert!(book.set_remaining(&order.order_id, order.price, Quantity::zero()));
        assert!(book.is_empty());
    }

    #[test]
    fn test_depth_snapshot_highest_first() {
        let mut book = BidBook::new();
        book.insert(&create_order(50_000, "1.0", 1));
        book.insert(&create_order(51_000, "2.0", 2));
        book.insert(&create_order(49_000, "1.5", 3));
        book.insert(&create_order(52_000, "0.5", 4));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0, Price::from_u64(52_000));
        assert_eq!(depth[1].0, Price::from_u64(51_000));
    }
}
