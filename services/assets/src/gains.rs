//! Realized-gain lot accounting
//!
//! Consumes a chronological sequence of signed (quantity, price) pairs:
//! positive quantities open lots, negative quantities dispose of held lots
//! under a selectable strategy. The realized gain is the sum of
//! `(disposal price - lot price) x consumed quantity` over every
//! consumption. Pure computation: no persistence, no clock, idempotent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Gain calculation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GainError {
    /// A disposal asked for more than the open inventory held. The history
    /// is inconsistent; silently capping would under-report the gain.
    #[error("disposal exceeds recorded inventory by {excess}")]
    InsufficientInventory { excess: Decimal },

    #[error("unknown lot strategy: {0}")]
    UnknownStrategy(String),

    #[error("link references a missing transaction: {0}")]
    MissingTransaction(types::ids::TransactionId),
}

/// Lot selection strategy for disposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GainStrategy {
    /// Consume the earliest open lot first.
    #[default]
    Fifo,
    /// Consume the most recently opened lot first.
    Lifo,
    /// At each step, consume the lot with the largest per-unit gain
    /// against the disposal price.
    Max,
}

impl FromStr for GainStrategy {
    type Err = GainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fifo" => Ok(GainStrategy::Fifo),
            "lifo" => Ok(GainStrategy::Lifo),
            "max" => Ok(GainStrategy::Max),
            other => Err(GainError::UnknownStrategy(other.to_string())),
        }
    }
}

/// An unconsumed portion of a prior acquisition.
#[derive(Debug, Clone, PartialEq)]
struct Lot {
    quantity: Decimal,
    price: Decimal,
}

/// Compute the realized gain over a chronological pair sequence.
///
/// The sequence is taken as-is, never re-sorted; the caller is responsible
/// for time ordering. The result can be negative (a realized loss).
pub fn calculate_gain(
    pairs: &[(Decimal, Decimal)],
    strategy: GainStrategy,
) -> Result<Decimal, GainError> {
    let mut inventory: Vec<Lot> = Vec::new();
    let mut gain = Decimal::ZERO;

    for &(quantity, price) in pairs {
        if quantity > Decimal::ZERO {
            inventory.push(Lot { quantity, price });
            continue;
        }

        let mut to_dispose = -quantity;
        while to_dispose > Decimal::ZERO {
            let Some(index) = select_lot(&inventory, price, strategy) else {
                return Err(GainError::InsufficientInventory { excess: to_dispose });
            };
            let consumed = to_dispose.min(inventory[index].quantity);
            gain += (price - inventory[index].price) * consumed;
            inventory[index].quantity -= consumed;
            to_dispose -= consumed;
            // Exhausted lots leave the inventory immediately; selection
            // never sees a zero-quantity lot.
            if inventory[index].quantity.is_zero() {
                inventory.remove(index);
            }
        }
    }

    Ok(gain)
}

/// Pick the next lot to consume. Ties under `max` resolve to the earliest
/// lot, keeping the computation deterministic.
fn select_lot(inventory: &[Lot], disposal_price: Decimal, strategy: GainStrategy) -> Option<usize> {
    if inventory.is_empty() {
        return None;
    }
    let index = match strategy {
        GainStrategy::Fifo => 0,
        GainStrategy::Lifo => inventory.len() - 1,
        GainStrategy::Max => {
            let mut best = 0;
            for (i, lot) in inventory.iter().enumerate().skip(1) {
                if disposal_price - lot.price > disposal_price - inventory[best].price {
                    best = i;
                }
            }
            best
        }
    };
    Some(index)
}
