//! Trade construction
//!
//! Builds trade records with a gapless monotonic sequence. Trades are built
//! during planning against a tentative sequence window and the counter
//! advances only once the whole submission commits, so an aborted
//! submission never burns sequence numbers.

use types::ids::{MemberId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

/// Trade factory owning the per-engine trade sequence.
#[derive(Debug)]
pub struct TradeExecutor {
    next_sequence: u64,
}

impl TradeExecutor {
    pub fn new() -> Self {
        Self { next_sequence: 1 }
    }

    /// Next sequence a committed trade will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Raise the counter to at least `sequence` (used during replay).
    pub fn observe_sequence(&mut self, sequence: u64) {
        if sequence >= self.next_sequence {
            self.next_sequence = sequence + 1;
        }
    }

    /// Build the `offset`-th trade of a submission being planned.
    ///
    /// `price` is the resting (maker) order's limit price; the taker never
    /// trades at its own price when the maker's is better.
    pub fn build_trade(
        &self,
        offset: u64,
        taker: &Order,
        maker_order_id: OrderId,
        maker_member_id: MemberId,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        let (buy_order_id, sell_order_id, buyer_id, seller_id) = match taker.side {
            Side::Buy => (taker.order_id, maker_order_id, taker.member_id, maker_member_id),
            Side::Sell => (maker_order_id, taker.order_id, maker_member_id, taker.member_id),
        };

        Trade::new(
            taker.family_id,
            taker.asset_id,
            buy_order_id,
            sell_order_id,
            buyer_id,
            seller_id,
            taker.side,
            price,
            quantity,
            self.next_sequence + offset,
            timestamp,
        )
    }

    /// Commit `count` planned trades, advancing the sequence window.
    pub fn advance(&mut self, count: u64) {
        self.next_sequence += count;
    }
}

impl Default for TradeExecutor {
    fn default() -> Self {
        Self::new()
    }
}
