//! Journal replay
//!
//! Rebuilds engine state by re-applying the journaled event stream. The
//! reader stops at any corrupted tail, so an interrupted batch from a crash
//! is never half-applied; the writer truncates that tail when it reopens.

use crate::engine::{EngineError, ExchangeEngine};
use crate::events::ExchangeEvent;
use crate::sink::{JournalSink, NullSink};
use persistence::{JournalError, JournalReader, JournalWriter, ReaderError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("undecodable event at sequence {sequence}: {detail}")]
    Decode { sequence: u64, detail: String },

    #[error("replay diverged: {0}")]
    Apply(#[from] EngineError),
}

/// Rebuild an ephemeral engine from a journal file.
pub fn replay_journal(path: impl AsRef<Path>) -> Result<ExchangeEngine<NullSink>, ReplayError> {
    let mut reader = JournalReader::open(path.as_ref())?;
    let mut engine = ExchangeEngine::in_memory();
    let mut replayed = 0u64;

    while let Some(entry) = reader.next_entry()? {
        let event: ExchangeEvent =
            serde_json::from_slice(&entry.payload).map_err(|err| ReplayError::Decode {
                sequence: entry.sequence,
                detail: err.to_string(),
            })?;
        engine.apply_event(&event)?;
        replayed += 1;
    }

    info!(
        path = %path.as_ref().display(),
        replayed,
        truncated_tail = reader.corruption().is_some(),
        "journal replayed"
    );
    Ok(engine)
}

/// Open a durable engine: replay the journal, then attach it for appends.
///
/// Opening the writer truncates any corrupted tail, so the attached journal
/// continues exactly from the replayed state.
pub fn open_durable(path: impl AsRef<Path>) -> Result<ExchangeEngine<JournalSink>, ReplayError> {
    let path = path.as_ref();
    let engine = replay_journal(path)?;
    let writer = JournalWriter::open(path)?;
    Ok(engine.replace_sink(JournalSink::new(writer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use types::ids::{AssetId, FamilyId, MemberId};
    use types::numeric::{Price, Quantity};
    use types::order::{Order, OrderStatus, Side};

    const T0: i64 = 1_754_000_000_000_000_000;

    fn order(
        family: FamilyId,
        asset: AssetId,
        side: Side,
        price: u64,
        qty: &str,
        timestamp: i64,
    ) -> Order {
        Order::new(
            family,
            MemberId::new(),
            asset,
            side,
            Price::from_u64(price),
            Quantity::from_str(qty).unwrap(),
            timestamp,
        )
        .unwrap()
    }

    #[test]
    fn test_replay_reconstructs_state() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exchange.journal");
        let family = FamilyId::new();
        let asset = AssetId::new();

        let (maker_id, taker_id, cancelled_id) = {
            let mut engine =
                ExchangeEngine::with_sink(JournalSink::open(&path).unwrap());

            let maker = engine
                .submit_order(order(family, asset, Side::Sell, 100, "1.0", T0), T0)
                .unwrap();
            let taker = engine
                .submit_order(order(family, asset, Side::Buy, 100, "0.4", T0 + 1), T0 + 1)
                .unwrap();
            let resting = engine
                .submit_order(order(family, asset, Side::Buy, 90, "2.0", T0 + 2), T0 + 2)
                .unwrap();
            engine.cancel_order(&resting.order.order_id, T0 + 3).unwrap();

            (
                maker.order.order_id,
                taker.order.order_id,
                resting.order.order_id,
            )
        };

        let replayed = replay_journal(&path).unwrap();

        let maker = replayed.order(&maker_id).unwrap();
        assert_eq!(maker.status, OrderStatus::Partial);
        assert_eq!(maker.remaining, Quantity::from_str("0.6").unwrap());

        let taker = replayed.order(&taker_id).unwrap();
        assert_eq!(taker.status, OrderStatus::Filled);

        let cancelled = replayed.order(&cancelled_id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        assert_eq!(replayed.trades().len(), 1);
        let snapshot = replayed.book_snapshot(family, asset, 10);
        assert_eq!(
            snapshot.asks,
            vec![(Price::from_u64(100), Quantity::from_str("0.6").unwrap())]
        );
        assert!(snapshot.bids.is_empty());
    }

    #[test]
    fn test_reopened_engine_continues_matching() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("exchange.journal");
        let family = FamilyId::new();
        let asset = AssetId::new();

        {
            let mut engine = open_durable(&path).unwrap();
            engine
                .submit_order(order(family, asset, Side::Sell, 100, "1.0", T0), T0)
                .unwrap();
        }

        let mut engine = open_durable(&path).unwrap();
        let submission = engine
            .submit_order(order(family, asset, Side::Buy, 100, "1.0", T0 + 1), T0 + 1)
            .unwrap();

        assert_eq!(submission.trades.len(), 1);
        assert_eq!(submission.order.status, OrderStatus::Filled);

        // And the trade survives another reopen.
        drop(engine);
        let replayed = replay_journal(&path).unwrap();
        assert_eq!(replayed.trades().len(), 1);
    }

    #[test]
    fn test_replay_empty_journal() {
        let tmp = TempDir::new().unwrap();
        let engine = replay_journal(tmp.path().join("none.journal")).unwrap();
        assert!(engine.trades().is_empty());
    }
}
