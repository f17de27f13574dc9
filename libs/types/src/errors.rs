//! Shared error taxonomy
//!
//! Per-concern thiserror enums. Crate-local errors (engine, journal, gain
//! calculation) live with their modules and convert from these at the seams.

use crate::ids::{AccountId, TransactionId};
use crate::numeric::Quantity;
use crate::order::OrderStatus;
use thiserror::Error;

/// Errors constructing decimal domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("unparseable decimal: {0}")]
    Unparseable(String),
}

/// Errors in order state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order quantity must be positive")]
    ZeroQuantity,

    #[error("order already in terminal state: {status:?}")]
    AlreadyTerminal { status: OrderStatus },

    #[error("fill {fill} exceeds remaining {remaining}")]
    Overfill { remaining: Quantity, fill: Quantity },
}

/// Errors validating or posting double-entry ledger transactions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transaction amount must be positive, got {0}")]
    NonPositiveAmount(String),

    #[error("debit and credit accounts must differ ({0})")]
    SameAccount(AccountId),

    #[error("account not found: {0}")]
    UnknownAccount(AccountId),

    #[error("account {0} belongs to a different family")]
    CrossFamily(AccountId),

    #[error("duplicate transaction: {0}")]
    DuplicateTransaction(TransactionId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_error_display() {
        let err = OrderError::AlreadyTerminal {
            status: OrderStatus::Filled,
        };
        assert!(err.to_string().contains("terminal"));
    }

    #[test]
    fn test_ledger_error_display() {
        let account = AccountId::new();
        let err = LedgerError::SameAccount(account);
        assert!(err.to_string().contains(&account.to_string()));
    }
}
