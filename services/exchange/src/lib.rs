//! Virtual exchange matching engine
//!
//! Price/time-priority continuous matching of single-price limit orders,
//! scoped per (family, asset) book.
//!
//! **Key invariants:**
//! - Price priority first, strict FIFO among equal prices
//! - Every trade executes at the resting (maker) order's limit price
//! - Conservation: an order's fills always sum to quantity minus remaining
//! - A submission's order updates and trades commit all-or-nothing
//! - Deterministic: same inputs produce the same trades, no clock reads

pub mod book;
pub mod engine;
pub mod events;
pub mod matching;
pub mod replay;
pub mod sink;

pub use engine::{BookKey, BookSnapshot, EngineError, ExchangeEngine, Submission};
pub use events::ExchangeEvent;
pub use replay::{open_durable, replay_journal, ReplayError};
pub use sink::{EventSink, JournalSink, NullSink, SinkError};
