//! Journal writer: an append-only event log with checksums
//!
//! Each order submission commits as one batch: every entry the submission
//! produced is framed, checksummed, and written with a single flush+fsync.
//! If the write fails nothing is applied by the caller, and the interrupted
//! tail is cut off on the next open, so replay never observes a partial
//! submission.
//!
//! # Binary format (per entry)
//! ```text
//! [total_len: u32]
//! [sequence:  u64]
//! [timestamp: i64]
//! [event_type_len: u16][event_type: bytes]
//! [payload_len: u32][payload: bytes]
//! [checksum: u32]  // CRC32C over sequence+timestamp+event_type+payload
//! ```

use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed entry: {0}")]
    Malformed(String),

    #[error("journal poisoned by an earlier failed write")]
    Poisoned,
}

// ── Journal Entry ───────────────────────────────────────────────────

/// A single journal entry representing one persisted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Gapless monotonic sequence number, assigned by the writer.
    pub sequence: u64,
    /// Unix nanosecond timestamp supplied by the caller.
    pub timestamp: i64,
    /// Event type tag, e.g. `order_accepted`.
    pub event_type: String,
    /// Serialized event payload (serde_json).
    pub payload: Vec<u8>,
    /// CRC32C checksum over (sequence ++ timestamp ++ event_type ++ payload).
    pub checksum: u32,
}

impl JournalEntry {
    /// Create a new entry, computing the CRC32C checksum automatically.
    pub fn new(sequence: u64, timestamp: i64, event_type: String, payload: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(sequence, timestamp, &event_type, &payload);
        Self {
            sequence,
            timestamp,
            event_type,
            payload,
            checksum,
        }
    }

    /// Compute CRC32C over the concatenation of the entry fields.
    pub fn compute_checksum(
        sequence: u64,
        timestamp: i64,
        event_type: &str,
        payload: &[u8],
    ) -> u32 {
        let mut buf = Vec::with_capacity(8 + 8 + event_type.len() + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(event_type.as_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    /// Validate the stored checksum against a recomputed value.
    pub fn verify_checksum(&self) -> bool {
        let expected =
            Self::compute_checksum(self.sequence, self.timestamp, &self.event_type, &self.payload);
        self.checksum == expected
    }

    /// Serialize the entry to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let event_type_bytes = self.event_type.as_bytes();
        let event_type_len = event_type_bytes.len() as u16;
        let payload_len = self.payload.len() as u32;

        // body = 8 (seq) + 8 (ts) + 2 (et_len) + et + 4 (pl_len) + pl + 4 (crc)
        let body_len: u32 = 8 + 8 + 2 + (event_type_len as u32) + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&event_type_len.to_le_bytes());
        buf.extend_from_slice(event_type_bytes);
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize an entry from the binary wire format.
    ///
    /// Returns `(entry, bytes_consumed)` on success. Truncated or garbage
    /// data yields an error rather than a panic.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Malformed(
                "not enough data for length prefix".into(),
            ));
        }

        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        // Reject absurd lengths early: almost certainly corruption.
        if body_len > 100_000_000 {
            return Err(JournalError::Malformed(format!(
                "implausible body length {}",
                body_len
            )));
        }

        // Minimum body: 8 + 8 + 2 + 0 + 4 + 0 + 4 = 26
        if body_len < 26 {
            return Err(JournalError::Malformed(format!(
                "body too small: {} bytes",
                body_len
            )));
        }

        let total = 4 + body_len;
        if data.len() < total {
            return Err(JournalError::Malformed(format!(
                "incomplete entry: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        let body = &data[4..total];
        let mut pos: usize = 0;

        let sequence = u64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let timestamp = i64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        let event_type_len = u16::from_le_bytes(body[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;

        if pos + event_type_len + 4 + 4 > body.len() {
            return Err(JournalError::Malformed(format!(
                "event_type_len {} exceeds body",
                event_type_len
            )));
        }
        let event_type = String::from_utf8(body[pos..pos + event_type_len].to_vec())
            .map_err(|e| JournalError::Malformed(e.to_string()))?;
        pos += event_type_len;

        let payload_len = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;

        if pos + payload_len + 4 > body.len() {
            return Err(JournalError::Malformed(format!(
                "payload_len {} exceeds body",
                payload_len
            )));
        }
        let payload = body[pos..pos + payload_len].to_vec();
        pos += payload_len;

        let checksum = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap());

        Ok((
            Self {
                sequence,
                timestamp,
                event_type,
                payload,
                checksum,
            },
            total,
        ))
    }
}

// ── Batch Items ─────────────────────────────────────────────────────

/// One event of a commit batch, before sequencing.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub timestamp: i64,
    pub event_type: String,
    pub payload: Vec<u8>,
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Append-only journal writer over a single file.
///
/// Sequences are assigned by the writer, starting at 1, and only advance
/// once a batch has reached disk. A failed write poisons the writer: the
/// file tail is in an unknown state and must be recovered by reopening.
pub struct JournalWriter {
    path: PathBuf,
    writer: BufWriter<fs::File>,
    next_sequence: u64,
    poisoned: bool,
}

impl JournalWriter {
    /// Open a journal for appending, creating it if missing.
    ///
    /// Any corrupted tail left by an interrupted write is truncated away so
    /// new entries continue the valid prefix gaplessly.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let (last_sequence, valid_len, had_corruption) = Self::scan_tail(&path)?;
        if had_corruption {
            warn!(path = %path.display(), valid_len, "truncating corrupted journal tail");
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        file.set_len(valid_len)?;
        file.seek(SeekFrom::End(0))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            next_sequence: last_sequence.map_or(1, |seq| seq + 1),
            poisoned: false,
        })
    }

    /// The sequence the next appended entry will receive.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single event. Equivalent to a batch of one.
    pub fn append(&mut self, item: BatchItem) -> Result<u64, JournalError> {
        let sequences = self.append_batch(&[item])?;
        Ok(sequences[0])
    }

    /// Append a batch of events as one commit unit.
    ///
    /// All entries are framed into one buffer and written with a single
    /// flush and fsync. The sequence counter advances only after the data
    /// has reached disk; on failure the writer is poisoned and the caller
    /// must treat the whole batch as unwritten.
    pub fn append_batch(&mut self, items: &[BatchItem]) -> Result<Vec<u64>, JournalError> {
        if self.poisoned {
            return Err(JournalError::Poisoned);
        }

        let mut buf = Vec::new();
        let mut sequences = Vec::with_capacity(items.len());
        let mut seq = self.next_sequence;
        for item in items {
            let entry = JournalEntry::new(
                seq,
                item.timestamp,
                item.event_type.clone(),
                item.payload.clone(),
            );
            buf.extend_from_slice(&entry.to_bytes());
            sequences.push(seq);
            seq += 1;
        }

        if let Err(err) = self.write_durably(&buf) {
            self.poisoned = true;
            return Err(err);
        }

        self.next_sequence = seq;
        Ok(sequences)
    }

    fn write_durably(&mut self, data: &[u8]) -> Result<(), JournalError> {
        self.writer.write_all(data)?;
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }

    /// Scan an existing file for its valid prefix.
    ///
    /// Returns the last valid sequence, the byte length of the valid
    /// prefix, and whether a corrupted tail was found.
    fn scan_tail(path: &Path) -> Result<(Option<u64>, u64, bool), JournalError> {
        if !path.exists() {
            return Ok((None, 0, false));
        }
        let data = fs::read(path)?;
        let mut pos = 0usize;
        let mut last_sequence = None;
        while pos < data.len() {
            match JournalEntry::from_bytes(&data[pos..]) {
                Ok((entry, consumed)) if entry.verify_checksum() => {
                    last_sequence = Some(entry.sequence);
                    pos += consumed;
                }
                _ => return Ok((last_sequence, pos as u64, true)),
            }
        }
        Ok((last_sequence, pos as u64, false))
    }
}

// ── Tests ───────────────────────────────────────────────────────────
