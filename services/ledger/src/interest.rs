//! Monthly interest accrual
//!
//! For every account carrying a positive monthly rate and a positive
//! balance, posts one transaction debiting the account and crediting the
//! family's interest income account. Scheduling is the embedder's job;
//! this is only the posting pass.

use rust_decimal::Decimal;
use tracing::info;
use types::errors::LedgerError;
use types::ids::TransactionId;
use types::ledger::{AccountKind, Transaction};
use types::numeric::round_money;

use crate::store::Ledger;

/// Name of the auto-created income account interest is credited to.
pub const INTEREST_INCOME_ACCOUNT: &str = "Interest Income";

/// Run one accrual pass over every interest-bearing account.
///
/// Interest is `balance x monthly rate`, rounded to cents half-up.
/// Accounts with a non-positive balance, or whose interest rounds to zero,
/// are skipped. Returns the posted transaction ids.
pub fn accrue_monthly_interest(
    ledger: &mut Ledger,
    timestamp: i64,
) -> Result<Vec<TransactionId>, LedgerError> {
    let candidates: Vec<_> = ledger
        .accounts()
        .filter(|account| account.interest_rate > Decimal::ZERO)
        .map(|account| (account.account_id, account.interest_rate))
        .collect();

    let mut posted = Vec::new();
    for (account_id, rate) in candidates {
        let balance = ledger.balance(&account_id)?;
        if balance <= Decimal::ZERO {
            continue;
        }
        let interest = round_money(balance * rate);
        if interest <= Decimal::ZERO {
            continue;
        }

        let income = ledger.get_or_create_account(INTEREST_INCOME_ACCOUNT, AccountKind::Income);
        let transaction = Transaction::new(
            ledger.family_id(),
            "Monthly Interest",
            interest,
            account_id,
            income,
            timestamp,
        )?;
        info!(account_id = %account_id, interest = %interest, "interest accrued");
        posted.push(ledger.post(transaction)?);
    }
    Ok(posted)
}
