//! Events emitted by the matching engine
//!
//! One submission produces one `OrderAccepted` followed by zero or more
//! `TradeExecuted`; cancellation produces one `OrderCancelled`. The event
//! stream is sufficient to rebuild engine state by replay.

use serde::{Deserialize, Serialize};
use types::ids::{AssetId, FamilyId, OrderId};
use types::order::Order;
use types::trade::Trade;

/// A journaled engine event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ExchangeEvent {
    /// A new order entered the engine (prior to any matching).
    OrderAccepted { order: Order },
    /// A trade executed; both participating orders shrink by its quantity.
    TradeExecuted { trade: Trade },
    /// A live order was cancelled and left the book.
    OrderCancelled {
        order_id: OrderId,
        family_id: FamilyId,
        asset_id: AssetId,
        cancelled_at: i64,
    },
}

impl ExchangeEvent {
    /// Event type tag used for journal entries.
    pub fn kind(&self) -> &'static str {
        match self {
            ExchangeEvent::OrderAccepted { .. } => "order_accepted",
            ExchangeEvent::TradeExecuted { .. } => "trade_executed",
            ExchangeEvent::OrderCancelled { .. } => "order_cancelled",
        }
    }

    /// Timestamp the event carries.
    pub fn timestamp(&self) -> i64 {
        match self {
            ExchangeEvent::OrderAccepted { order } => order.created_at,
            ExchangeEvent::TradeExecuted { trade } => trade.executed_at,
            ExchangeEvent::OrderCancelled { cancelled_at, .. } => *cancelled_at,
        }
    }
}
