//! Double-entry ledger service
//!
//! An in-process store of accounts and immutable transactions for one
//! family, with derived balances and a monthly interest accrual pass.

pub mod interest;
pub mod store;

pub use interest::{accrue_monthly_interest, INTEREST_INCOME_ACCOUNT};
pub use store::Ledger;
