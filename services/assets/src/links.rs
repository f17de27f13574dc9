//! Gain derivation from transaction links
//!
//! Joins an asset's transaction links with the underlying ledger
//! transactions, orders them by transaction creation time, and feeds the
//! resulting (signed quantity, price) sequence to the gain calculator. The
//! link quantity sign already encodes acquisition vs disposal; the linked
//! transaction's amount is the lot price.

use rust_decimal::Decimal;
use std::collections::HashMap;
use types::asset::AssetTransactionLink;
use types::ids::{AssetId, TransactionId};
use types::ledger::Transaction;

use crate::gains::{calculate_gain, GainError, GainStrategy};

/// Derive the chronological (signed quantity, price) pairs for one asset.
///
/// Ordering follows the linked transaction's creation time, with the
/// transaction id as a deterministic tie-break.
pub fn chronological_pairs(
    asset_id: AssetId,
    links: &[AssetTransactionLink],
    transactions: &[Transaction],
) -> Result<Vec<(Decimal, Decimal)>, GainError> {
    let by_id: HashMap<TransactionId, &Transaction> = transactions
        .iter()
        .map(|transaction| (transaction.transaction_id, transaction))
        .collect();

    let mut joined = Vec::new();
    for link in links.iter().filter(|link| link.asset_id == asset_id) {
        let transaction = by_id
            .get(&link.transaction_id)
            .ok_or(GainError::MissingTransaction(link.transaction_id))?;
        joined.push((link, *transaction));
    }
    joined.sort_by_key(|(_, transaction)| (transaction.created_at, transaction.transaction_id));

    Ok(joined
        .into_iter()
        .map(|(link, transaction)| (link.quantity, transaction.amount))
        .collect())
}

/// Realized gain for one asset from its recorded transaction links.
pub fn gain_for_asset(
    asset_id: AssetId,
    links: &[AssetTransactionLink],
    transactions: &[Transaction],
    strategy: GainStrategy,
) -> Result<Decimal, GainError> {
    let pairs = chronological_pairs(asset_id, links, transactions)?;
    calculate_gain(&pairs, strategy)
}
