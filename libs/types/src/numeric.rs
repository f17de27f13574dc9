//! Fixed-point decimal types for prices and quantities
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Prices and quantities carry four decimal places; ledger money is rounded
//! to two, half-up.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::errors::NumericError;

/// Decimal places stored for prices and quantities.
pub const UNIT_SCALE: u32 = 4;

/// Decimal places stored for ledger amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round a ledger amount to two decimal places, half-up.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// A strictly positive limit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative values.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::InvalidPrice(value.to_string()));
        }
        Ok(Self(quantize(value)))
    }

    /// Create a price from a whole number of currency units.
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse a price from its decimal string form.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value =
            Decimal::from_str(s).map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative quantity of an asset.
///
/// Zero is representable so that a fully consumed remainder can be held and
/// compared, but orders are created with strictly positive quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity, rejecting negative values.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value < Decimal::ZERO {
            return Err(NumericError::InvalidQuantity(value.to_string()));
        }
        Ok(Self(quantize(value)))
    }

    /// Parse a quantity from its decimal string form.
    pub fn from_str(s: &str) -> Result<Self, NumericError> {
        let value =
            Decimal::from_str(s).map_err(|_| NumericError::Unparseable(s.to_string()))?;
        Self::try_new(value)
    }

    /// The zero quantity.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Subtract `other`, failing if the result would be negative.
    pub fn checked_sub(&self, other: Quantity) -> Result<Self, NumericError> {
        Self::try_new(self.0 - other.0)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_non_positive() {
        assert!(Price::try_new(Decimal::ZERO).is_err());
        assert!(Price::try_new(Decimal::from(-5)).is_err());
        assert!(Price::try_new(Decimal::ONE).is_ok());
    }

    #[test]
    fn test_price_from_str() {
        let price = Price::from_str("3000.50").unwrap();
        assert_eq!(price.as_decimal(), Decimal::from_str("3000.50").unwrap());
        assert!(Price::from_str("not-a-number").is_err());
        assert!(Price::from_str("-1").is_err());
    }

    #[test]
    fn test_price_ordering() {
        let low = Price::from_u64(49000);
        let high = Price::from_u64(50000);
        assert!(low < high);
        assert_eq!(low.min(high), low);
    }

    #[test]
    fn test_quantity_rejects_negative() {
        assert!(Quantity::try_new(Decimal::from(-1)).is_err());
        assert!(Quantity::try_new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_quantity_checked_sub() {
        let a = Quantity::from_str("1.5").unwrap();
        let b = Quantity::from_str("0.5").unwrap();
        assert_eq!(a.checked_sub(b).unwrap(), Quantity::from_str("1.0").unwrap());
        assert!(b.checked_sub(a).is_err());
    }

    #[test]
    fn test_quantity_add() {
        let a = Quantity::from_str("1.5").unwrap();
        let b = Quantity::from_str("2.5").unwrap();
        assert_eq!(a + b, Quantity::from_str("4.0").unwrap());
    }

    #[test]
    fn test_quantize_to_four_places() {
        let q = Quantity::try_new(Decimal::from_str("1.00005").unwrap()).unwrap();
        assert_eq!(q.as_decimal(), Decimal::from_str("1.0001").unwrap());
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(
            round_money(Decimal::from_str("10.005").unwrap()),
            Decimal::from_str("10.01").unwrap()
        );
        assert_eq!(
            round_money(Decimal::from_str("10.004").unwrap()),
            Decimal::from_str("10.00").unwrap()
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let price = Price::from_str("123.45").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, back);
    }
}
