//! Event sink seam
//!
//! The engine journals a submission's events through this trait before it
//! applies any in-memory mutation. A sink failure aborts the submission
//! with the engine state untouched, which is what makes the order/trade
//! updates all-or-nothing.

use crate::events::ExchangeEvent;
use persistence::{BatchItem, JournalError, JournalWriter};
use std::path::Path;
use thiserror::Error;

/// Failure to durably record a batch of events.
#[derive(Error, Debug)]
#[error("event sink failure: {reason}")]
pub struct SinkError {
    pub reason: String,
}

impl SinkError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Destination for a submission's event batch.
///
/// `commit` must be all-or-nothing: either every event of the batch is
/// durably recorded or the error guarantees none will be replayed.
pub trait EventSink {
    fn commit(&mut self, events: &[ExchangeEvent]) -> Result<(), SinkError>;
}

/// Sink that records nothing. Used for ephemeral engines and replay.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn commit(&mut self, _events: &[ExchangeEvent]) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink writing each batch to the append-only journal with a single flush.
pub struct JournalSink {
    writer: JournalWriter,
}

impl JournalSink {
    pub fn new(writer: JournalWriter) -> Self {
        Self { writer }
    }

    /// Open (or create) a journal file and wrap it as a sink.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        Ok(Self {
            writer: JournalWriter::open(path.as_ref())?,
        })
    }

    pub fn writer(&self) -> &JournalWriter {
        &self.writer
    }
}

impl EventSink for JournalSink {
    fn commit(&mut self, events: &[ExchangeEvent]) -> Result<(), SinkError> {
        let mut items = Vec::with_capacity(events.len());
        for event in events {
            let payload = serde_json::to_vec(event)
                .map_err(|err| SinkError::new(format!("encode {}: {}", event.kind(), err)))?;
            items.push(BatchItem {
                timestamp: event.timestamp(),
                event_type: event.kind().to_string(),
                payload,
            });
        }
        self.writer
            .append_batch(&items)
            .map(|_| ())
            .map_err(|err| SinkError::new(err.to_string()))
    }
}
