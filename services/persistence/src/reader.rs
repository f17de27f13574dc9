//! Journal reader: sequential replay with corruption detection
//!
//! Reads entries back in write order, validating the CRC32C checksum of
//! every entry and the gapless monotonic sequence across entries. A
//! corrupted or truncated tail (an interrupted batch) ends the stream
//! cleanly: the valid prefix is replayed, the tail is reported, and nothing
//! after the corruption point is ever surfaced.

use crate::journal::{JournalEntry, JournalError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },
}

// ── Corruption Reporting ────────────────────────────────────────────

/// Details of a detected corrupted tail.
#[derive(Debug, Clone)]
pub struct CorruptionRecord {
    /// Byte offset where the corruption begins.
    pub byte_offset: u64,
    pub kind: CorruptionKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptionKind {
    ChecksumMismatch,
    TruncatedEntry,
}

// ── Journal Reader ──────────────────────────────────────────────────

/// Sequential reader over one journal file.
pub struct JournalReader {
    path: PathBuf,
    data: Vec<u8>,
    pos: usize,
    last_sequence: Option<u64>,
    corruption: Option<CorruptionRecord>,
}

impl JournalReader {
    /// Open a reader over a journal file. A missing file reads as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReaderError> {
        let path = path.into();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            data,
            pos: 0,
            last_sequence: None,
            corruption: None,
        })
    }

    /// Read the next valid entry.
    ///
    /// Returns `Ok(None)` at end of stream, which is either the end of the
    /// file or the start of a corrupted tail (see [`corruption`]). A gap in
    /// otherwise valid sequences is structural damage and a hard error.
    ///
    /// [`corruption`]: JournalReader::corruption
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>, ReaderError> {
        if self.corruption.is_some() || self.pos >= self.data.len() {
            return Ok(None);
        }

        let offset = self.pos as u64;
        match JournalEntry::from_bytes(&self.data[self.pos..]) {
            Ok((entry, consumed)) => {
                if !entry.verify_checksum() {
                    self.corruption = Some(CorruptionRecord {
                        byte_offset: offset,
                        kind: CorruptionKind::ChecksumMismatch,
                        detail: format!(
                            "CRC32C mismatch for seq={}, stored={:#010x}",
                            entry.sequence, entry.checksum
                        ),
                    });
                    return Ok(None);
                }

                if let Some(last) = self.last_sequence {
                    if entry.sequence != last + 1 {
                        return Err(ReaderError::SequenceGap {
                            expected: last + 1,
                            got: entry.sequence,
                        });
                    }
                }

                self.pos += consumed;
                self.last_sequence = Some(entry.sequence);
                Ok(Some(entry))
            }
            Err(err) => {
                self.corruption = Some(CorruptionRecord {
                    byte_offset: offset,
                    kind: CorruptionKind::TruncatedEntry,
                    detail: format!(
                        "{} ({} bytes past offset)",
                        err,
                        self.data.len() - self.pos
                    ),
                });
                Ok(None)
            }
        }
    }

    /// Read every valid entry into a Vec.
    pub fn read_all(&mut self) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Last sequence successfully read so far.
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Byte length of the valid prefix consumed so far.
    pub fn valid_length(&self) -> u64 {
        self.pos as u64
    }

    /// The corrupted-tail record, if one was hit.
    pub fn corruption(&self) -> Option<&CorruptionRecord> {
        self.corruption.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ── Tests ───────────────────────────────────────────────────────────
