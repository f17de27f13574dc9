//! Ask (sell-side) order book
//!
//! Sell orders keyed by price in a BTreeMap for deterministic iteration;
//! matching walks prices ascending (cheapest ask first) with FIFO levels.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::{LevelEntry, PriceLevel};

/// Sell side of one asset's book.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
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

    /// Levels an incoming buy at `limit` may execute against, best
    /// (cheapest) price first.
    pub fn matchable(&self, limit: Price) -> impl Iterator<Item = (&Price, &PriceLevel)> {
        self.levels.range(..=limit)
    }

    /// Best ask price and total quantity at it.
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Top `depth` levels, cheapest price first.
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
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
