//! Order lifecycle types
//!
//! An order is a resting or historical request to buy or sell a fixed
//! quantity of one asset at a limit price, scoped to a family and the
//! member who submitted it. Orders are created once, mutated only by the
//! matching engine (fills) or the cancellation path, and never deleted.

use crate::errors::OrderError;
use crate::ids::{AssetId, FamilyId, MemberId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order status.
///
/// Transitions are monotonic: `open -> partial -> filled`, or
/// `open|partial -> cancelled`. Lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted, nothing filled yet.
    Open,
    /// Partially filled, remainder resting in the book.
    Partial,
    /// Completely filled (terminal).
    Filled,
    /// Cancelled by the owner before completion (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Check if the status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    /// Check if an order in this status can still rest in the book.
    pub fn is_live(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Partial)
    }
}

/// A limit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub family_id: FamilyId,
    pub member_id: MemberId,
    pub asset_id: AssetId,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub remaining: Quantity,
    pub status: OrderStatus,
    /// Acceptance sequence assigned once by the engine; drives FIFO time
    /// priority among equal prices. Never recomputed.
    pub sequence: u64,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new open order with `remaining` initialized to `quantity`.
    ///
    /// The sequence starts at zero and is assigned by the engine when the
    /// order is accepted into a book.
    pub fn new(
        family_id: FamilyId,
        member_id: MemberId,
        asset_id: AssetId,
        side: Side,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Result<Self, OrderError> {
        if quantity.is_zero() {
            return Err(OrderError::ZeroQuantity);
        }
        Ok(Self {
            order_id: OrderId::new(),
            family_id,
            member_id,
            asset_id,
            side,
            price,
            quantity,
            remaining: quantity,
            status: OrderStatus::Open,
            sequence: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Check the remaining/status invariant.
    pub fn check_invariant(&self) -> bool {
        match self.status {
            OrderStatus::Open => self.remaining == self.quantity,
            OrderStatus::Partial => {
                !self.remaining.is_zero() && self.remaining < self.quantity
            }
            OrderStatus::Filled => self.remaining.is_zero(),
            OrderStatus::Cancelled => self.remaining <= self.quantity,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }

    /// Check if the order can still participate in matching.
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Quantity executed so far.
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity
            .checked_sub(self.remaining)
            .unwrap_or_else(|_| Quantity::zero())
    }

    /// Decrement `remaining` by a fill and advance the status.
    ///
    /// The status becomes `filled` exactly when remaining reaches zero,
    /// `partial` otherwise.
    pub fn apply_fill(&mut self, fill: Quantity, timestamp: i64) -> Result<(), OrderError> {
        if !self.status.is_live() {
            return Err(OrderError::AlreadyTerminal {
                status: self.status,
            });
        }
        if fill.is_zero() {
            return Err(OrderError::ZeroQuantity);
        }
        let new_remaining = self.remaining.checked_sub(fill).map_err(|_| {
            OrderError::Overfill {
                remaining: self.remaining,
                fill,
            }
        })?;

        self.remaining = new_remaining;
        self.status = if new_remaining.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = timestamp;

        debug_assert!(self.check_invariant());
        Ok(())
    }

    /// Cancel a live order.
    pub fn cancel(&mut self, timestamp: i64) -> Result<(), OrderError> {
        if !self.status.is_live() {
            return Err(OrderError::AlreadyTerminal {
                status: self.status,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_754_000_000_000_000_000;

    fn create_order(side: Side, price: u64, qty: &str) -> Order {
        Order::new(
            FamilyId::new(),
            MemberId::new(),
            AssetId::new(),
            side,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            T0,
        )
        .unwrap()
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_order_creation() {
        let order = create_order(Side::Buy, 100, "2.0");
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining, order.quantity);
        assert!(order.check_invariant());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = Order::new(
            FamilyId::new(),
            MemberId::new(),
            AssetId::new(),
            Side::Buy,
            Price::from_u64(100),
            Quantity::zero(),
            T0,
        );
        assert_eq!(result.unwrap_err(), OrderError::ZeroQuantity);
    }

    #[test]
    fn test_partial_then_full_fill() {
        let mut order = create_order(Side::Buy, 100, "1.0");

        order.apply_fill(Quantity::from_str("0.3").unwrap(), T0 + 1).unwrap();
        assert_eq!(order.status, OrderStatus::Partial);
        assert_eq!(order.remaining, Quantity::from_str("0.7").unwrap());
        assert_eq!(order.filled_quantity(), Quantity::from_str("0.3").unwrap());
        assert!(order.check_invariant());

        order.apply_fill(Quantity::from_str("0.7").unwrap(), T0 + 2).unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.remaining.is_zero());
        assert!(order.check_invariant());
    }

    #[test]
    fn test_overfill_rejected() {
        let mut order = create_order(Side::Sell, 100, "1.0");
        let err = order
            .apply_fill(Quantity::from_str("1.5").unwrap(), T0 + 1)
            .unwrap_err();
        assert!(matches!(err, OrderError::Overfill { .. }));
        // State untouched after the failed fill
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining, order.quantity);
    }

    #[test]
    fn test_fill_after_terminal_rejected() {
        let mut order = create_order(Side::Buy, 100, "1.0");
        order.apply_fill(Quantity::from_str("1.0").unwrap(), T0 + 1).unwrap();
        let err = order
            .apply_fill(Quantity::from_str("0.1").unwrap(), T0 + 2)
            .unwrap_err();
        assert!(matches!(err, OrderError::AlreadyTerminal { .. }));
    }

    #[test]
    fn test_cancel_open_order() {
        let mut order = create_order(Side::Buy, 100, "1.0");
        order.cancel(T0 + 1).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.status.is_terminal());
    }

    #[test]
    fn test_cancel_terminal_rejected() {
        let mut order = create_order(Side::Buy, 100, "1.0");
        order.apply_fill(Quantity::from_str("1.0").unwrap(), T0 + 1).unwrap();
        assert!(order.cancel(T0 + 2).is_err());
    }

    #[test]
    fn test_wire_casing_is_lowercase() {
        let order = create_order(Side::Sell, 100, "1.0");
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"sell\""));
        assert!(json.contains("\"open\""));
    }
}
