//! Price level with a FIFO queue
//!
//! A price level holds every resting order at one price point, in strict
//! acceptance order, so time priority among equal prices falls out of queue
//! position.

use std::collections::VecDeque;
use types::ids::{MemberId, OrderId};
use types::numeric::Quantity;

/// A resting order's footprint in the book.
///
/// The order itself lives in the engine's order map; the level carries just
/// what the matching walk needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEntry {
    pub order_id: OrderId,
    pub member_id: MemberId,
    pub remaining: Quantity,
    /// Acceptance sequence of the order; entries are queued in this order.
    pub sequence: u64,
}

/// All resting orders at one price, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    entries: VecDeque<LevelEntry>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Queue an entry at the back (time priority).
    pub fn push_back(&mut self, entry: LevelEntry) {
        debug_assert!(
            self.entries
                .back()
                .map_or(true, |last| last.sequence < entry.sequence),
            "level entries must arrive in acceptance order"
        );
        self.entries.push_back(entry);
    }

    /// Remove an entry by order id, returning it if present.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<LevelEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.order_id == order_id)?;
        self.entries.remove(position)
    }

    /// Set an entry's remaining quantity after a fill.
    ///
    /// The entry is removed exactly when its remaining reaches zero.
    /// Returns false if the order is not queued at this level.
    pub fn set_remaining(&mut self, order_id: &OrderId, remaining: Quantity) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|entry| &entry.order_id == order_id)
        else {
            return false;
        };
        if remaining.is_zero() {
            self.entries.remove(position);
        } else {
            self.entries[position].remaining = remaining;
        }
        true
    }

    /// Iterate entries front (oldest) to back.
    pub fn entries(&self) -> impl Iterator<Item = &LevelEntry> {
        self.entries.iter()
    }

    /// Total resting quantity at this price.
    pub fn total_quantity(&self) -> Quantity {
        self.entries
            .iter()
            .fold(Quantity::zero(), |acc, entry| acc + entry.remaining)
    }

    pub fn order_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
