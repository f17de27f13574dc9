//! Trade execution records
//!
//! A trade pairs exactly one buy order and one sell order for an asset at a
//! single price and quantity. Trades are created only by the matching
//! engine, atomically with the participating orders' updates, and are never
//! mutated afterwards: they are the audit trail of the book.

use crate::ids::{AssetId, FamilyId, MemberId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An immutable execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub family_id: FamilyId,
    pub asset_id: AssetId,

    // Order references, keyed by side rather than by role
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Submitting members
    pub buyer_id: MemberId,
    pub seller_id: MemberId,

    /// Side of the incoming (taker) order.
    pub taker_side: Side,

    /// Execution price: always the resting (maker) order's limit price.
    pub price: Price,
    pub quantity: Quantity,

    /// Gapless monotonic sequence per engine.
    pub sequence: u64,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        family_id: FamilyId,
        asset_id: AssetId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer_id: MemberId,
        seller_id: MemberId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        sequence: u64,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            family_id,
            asset_id,
            buy_order_id,
            sell_order_id,
            buyer_id,
            seller_id,
            taker_side,
            price,
            quantity,
            sequence,
            executed_at,
        }
    }

    /// Traded value (price x quantity).
    pub fn notional(&self) -> Decimal {
        self.price.as_decimal() * self.quantity.as_decimal()
    }

    /// Check whether the given order participated in this trade.
    pub fn involves(&self, order_id: &OrderId) -> bool {
        &self.buy_order_id == order_id || &self.sell_order_id == order_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_trade(qty: &str, price: u64) -> Trade {
        Trade::new(
            FamilyId::new(),
            AssetId::new(),
            OrderId::new(),
            OrderId::new(),
            MemberId::new(),
            MemberId::new(),
            Side::Buy,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            42,
            1_754_000_000_000_000_000,
        )
    }

    #[test]
    fn test_notional() {
        let trade = create_trade("0.5", 50000);
        assert_eq!(trade.notional(), Decimal::from(25000));
    }

    #[test]
    fn test_involves() {
        let trade = create_trade("1.0", 100);
        assert!(trade.involves(&trade.buy_order_id));
        assert!(trade.involves(&trade.sell_order_id));
        assert!(!trade.involves(&OrderId::new()));
    }

    #[test]
    fn test_serialization_round_trip() {
        let trade = create_trade("2.5", 3000);
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
