//! Double-entry ledger types
//!
//! A transaction moves a positive amount from a credit account to a debit
//! account; the two accounts must differ. Validation happens at
//! construction so an invalid transaction is unrepresentable downstream.

use crate::errors::LedgerError;
use crate::ids::{AccountId, FamilyId, TransactionId};
use crate::numeric::round_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountKind {
    /// Debit-normal accounts grow when debited; the rest grow when credited.
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountKind::Asset | AccountKind::Expense)
    }
}

/// A ledger account within one family scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub family_id: FamilyId,
    pub name: String,
    pub kind: AccountKind,
    /// Monthly interest rate as a decimal (0.01 means 1% per month).
    pub interest_rate: Decimal,
}

impl Account {
    pub fn new(family_id: FamilyId, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            account_id: AccountId::new(),
            family_id,
            name: name.into(),
            kind,
            interest_rate: Decimal::ZERO,
        }
    }

    /// Set a monthly interest rate on the account.
    pub fn with_interest_rate(mut self, rate: Decimal) -> Self {
        self.interest_rate = rate;
        self
    }
}

/// An immutable double-entry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub family_id: FamilyId,
    pub description: String,
    /// Positive amount, two decimal places.
    pub amount: Decimal,
    pub debit_account: AccountId,
    pub credit_account: AccountId,
    pub created_at: i64, // Unix nanos
}

impl Transaction {
    /// Build a transaction, enforcing the double-entry invariants:
    /// a strictly positive amount and distinct debit/credit accounts.
    pub fn new(
        family_id: FamilyId,
        description: impl Into<String>,
        amount: Decimal,
        debit_account: AccountId,
        credit_account: AccountId,
        timestamp: i64,
    ) -> Result<Self, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount.to_string()));
        }
        if debit_account == credit_account {
            return Err(LedgerError::SameAccount(debit_account));
        }
        Ok(Self {
            transaction_id: TransactionId::new(),
            family_id,
            description: description.into(),
            amount: round_money(amount),
            debit_account,
            credit_account,
            created_at: timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const T0: i64 = 1_754_000_000_000_000_000;

    #[test]
    fn test_account_kind_normal_side() {
        assert!(AccountKind::Asset.is_debit_normal());
        assert!(AccountKind::Expense.is_debit_normal());
        assert!(!AccountKind::Liability.is_debit_normal());
        assert!(!AccountKind::Equity.is_debit_normal());
        assert!(!AccountKind::Income.is_debit_normal());
    }

    #[test]
    fn test_valid_transaction() {
        let family = FamilyId::new();
        let debit = AccountId::new();
        let credit = AccountId::new();
        let tx = Transaction::new(family, "Payday", Decimal::from(100), debit, credit, T0)
            .unwrap();
        assert_eq!(tx.debit_account, debit);
        assert_eq!(tx.credit_account, credit);
        assert_eq!(tx.amount, Decimal::from(100));
    }

    #[test]
    fn test_same_account_rejected() {
        let account = AccountId::new();
        let err = Transaction::new(
            FamilyId::new(),
            "Broken",
            Decimal::from(10),
            account,
            account,
            T0,
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::SameAccount(account));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        for amount in [Decimal::ZERO, Decimal::from(-5)] {
            let err = Transaction::new(
                FamilyId::new(),
                "Broken",
                amount,
                AccountId::new(),
                AccountId::new(),
                T0,
            )
            .unwrap_err();
            assert!(matches!(err, LedgerError::NonPositiveAmount(_)));
        }
    }

    #[test]
    fn test_amount_rounded_to_cents() {
        let tx = Transaction::new(
            FamilyId::new(),
            "Interest",
            Decimal::from_str("10.005").unwrap(),
            AccountId::new(),
            AccountId::new(),
            T0,
        )
        .unwrap();
        assert_eq!(tx.amount, Decimal::from_str("10.01").unwrap());
    }
}
