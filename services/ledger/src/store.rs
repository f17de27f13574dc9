//! Double-entry ledger store
//!
//! Accounts and posted transactions for one family scope. Transactions are
//! validated at construction (positive amount, distinct accounts); the
//! store additionally checks that both accounts exist in this family and
//! that a transaction is never posted twice. Posted transactions are
//! immutable: balances are always derived, never stored.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use types::errors::LedgerError;
use types::ids::{AccountId, FamilyId, TransactionId};
use types::ledger::{Account, AccountKind, Transaction};

/// One family's ledger.
pub struct Ledger {
    family_id: FamilyId,
    accounts: HashMap<AccountId, Account>,
    transactions: Vec<Transaction>,
    posted: HashSet<TransactionId>,
}

impl Ledger {
    pub fn new(family_id: FamilyId) -> Self {
        Self {
            family_id,
            accounts: HashMap::new(),
            transactions: Vec::new(),
            posted: HashSet::new(),
        }
    }

    pub fn family_id(&self) -> FamilyId {
        self.family_id
    }

    /// Register an account. Rejects accounts from another family.
    pub fn add_account(&mut self, account: Account) -> Result<AccountId, LedgerError> {
        if account.family_id != self.family_id {
            return Err(LedgerError::CrossFamily(account.account_id));
        }
        let account_id = account.account_id;
        self.accounts.insert(account_id, account);
        Ok(account_id)
    }

    /// Create a new account in this family.
    pub fn create_account(&mut self, name: impl Into<String>, kind: AccountKind) -> AccountId {
        let account = Account::new(self.family_id, name, kind);
        let account_id = account.account_id;
        self.accounts.insert(account_id, account);
        account_id
    }

    /// Find an account by name and kind, creating it on first use.
    pub fn get_or_create_account(&mut self, name: &str, kind: AccountKind) -> AccountId {
        if let Some(account) = self
            .accounts
            .values()
            .find(|account| account.name == name && account.kind == kind)
        {
            return account.account_id;
        }
        debug!(name, kind = ?kind, "creating ledger account");
        self.create_account(name, kind)
    }

    pub fn account(&self, account_id: &AccountId) -> Option<&Account> {
        self.accounts.get(account_id)
    }

    /// Mutable access, e.g. to adjust an interest rate.
    pub fn account_mut(&mut self, account_id: &AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(account_id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Post a validated transaction.
    pub fn post(&mut self, transaction: Transaction) -> Result<TransactionId, LedgerError> {
        if transaction.family_id != self.family_id {
            return Err(LedgerError::CrossFamily(transaction.debit_account));
        }
        for account_id in [transaction.debit_account, transaction.credit_account] {
            if !self.accounts.contains_key(&account_id) {
                return Err(LedgerError::UnknownAccount(account_id));
            }
        }
        if !self.posted.insert(transaction.transaction_id) {
            return Err(LedgerError::DuplicateTransaction(transaction.transaction_id));
        }

        debug!(
            transaction_id = %transaction.transaction_id,
            amount = %transaction.amount,
            "transaction posted"
        );
        let transaction_id = transaction.transaction_id;
        self.transactions.push(transaction);
        Ok(transaction_id)
    }

    /// Posted transactions in posting order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Derive an account's balance from its postings.
    ///
    /// Debit-normal accounts (asset, expense) grow with debits; the others
    /// grow with credits.
    pub fn balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        let account = self
            .accounts
            .get(account_id)
            .ok_or(LedgerError::UnknownAccount(*account_id))?;

        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for transaction in &self.transactions {
            if &transaction.debit_account == account_id {
                debits += transaction.amount;
            }
            if &transaction.credit_account == account_id {
                credits += transaction.amount;
            }
        }

        Ok(if account.kind.is_debit_normal() {
            debits - credits
        } else {
            credits - debits
        })
    }
}
