//! Crossing detection
//!
//! Price compatibility between an incoming order and a resting one: a buy
//! may only lift asks at or below its limit, a sell may only hit bids at or
//! above its limit.

use types::numeric::Price;
use types::order::Side;

/// Check whether a bid and an ask can trade.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check whether an incoming order crosses a resting order's price.
pub fn incoming_can_match(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::Buy => can_match(incoming_price, resting_price),
        Side::Sell => can_match(resting_price, incoming_price),
    }
}
