//! Persistence for the household virtual exchange
//!
//! An append-only, checksummed event journal plus a sequential reader for
//! deterministic replay. Each order submission is committed as one batch
//! with a single flush, so a crash can only ever lose whole submissions,
//! never halves of one.

pub mod journal;
pub mod reader;

pub use journal::{BatchItem, JournalEntry, JournalError, JournalWriter};
pub use reader::{CorruptionKind, CorruptionRecord, JournalReader, ReaderError};
