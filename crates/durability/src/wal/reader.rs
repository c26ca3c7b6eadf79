//! Write-ahead log replay.
//!
//! [`replay`] enumerates segments in sequence order, parses records
//! end-to-end, and stops at the first checksum failure or truncated record —
//! conservatively, rather than attempting to skip past corruption and
//! resume scanning later in the stream. A record whose `lsn` does not match
//! its actual position in the stream is a distinct, fatal failure (framing
//! is otherwise intact) and aborts replay outright instead of treating it as
//! a recoverable stopping point.

use super::segment::{list_segment_numbers, segment_path};
use crate::format::record::{LogRecord, RecordError};
use dirtxn_core::error::{Result, TxnError};
use dirtxn_core::types::Lsn;
use std::path::Path;

/// Why [`replay`] stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStopReason {
    /// Every segment was consumed cleanly to its end.
    EndOfLog,
    /// A record's checksum, shape, or kind byte was invalid.
    Corrupt,
    /// A record was cut off mid-write (fewer bytes on disk than its header
    /// declares).
    Truncated,
}

/// Result of replaying every segment in a WAL directory.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Every record successfully parsed, in LSN order.
    pub records: Vec<(Lsn, LogRecord)>,
    /// Why replay stopped (clean end, corruption, or truncation).
    pub stop_reason: ReadStopReason,
    /// Segment number to resume appending into.
    pub resume_segment: u64,
    /// Byte offset within `resume_segment` where the next record should be
    /// written (and where any trailing corruption should be truncated).
    pub resume_offset_in_segment: u64,
    /// Byte offset where `resume_segment` begins within the logical stream.
    pub resume_base_offset: u64,
}

impl ReplayOutcome {
    /// The valid length of the logical log stream: everything before this
    /// offset parsed as well-formed records.
    pub fn valid_stream_length(&self) -> u64 {
        self.resume_base_offset + self.resume_offset_in_segment
    }
}

/// Replay every segment under `dir`. Returns `Ok` with an empty
/// [`ReplayOutcome`] (resume at segment 0, offset 0) if `dir` contains no
/// segments yet.
///
/// Each record's `lsn` must equal the byte offset at which it begins in the
/// logical stream (`base_offset` of its segment plus the offset parsing
/// reached within that segment so far). A record that passes its own CRC but
/// carries an `lsn` inconsistent with that position indicates the log was
/// assembled out of order or spliced from another stream; replay treats this
/// as fatal and returns [`TxnError::InvalidLog`] rather than silently
/// accepting it, distinct from the non-fatal `Corrupt`/`Truncated` stops
/// below, which describe ordinary crash-mid-write tail corruption.
pub fn replay(dir: &Path) -> Result<ReplayOutcome> {
    let seqs = list_segment_numbers(dir)?;
    if seqs.is_empty() {
        return Ok(ReplayOutcome {
            records: Vec::new(),
            stop_reason: ReadStopReason::EndOfLog,
            resume_segment: 0,
            resume_offset_in_segment: 0,
            resume_base_offset: 0,
        });
    }

    let mut records = Vec::new();
    let mut base_offset = 0u64;
    let mut stop_reason = ReadStopReason::EndOfLog;
    let mut resume_segment = seqs[0];
    let mut resume_offset_in_segment = 0u64;
    let mut resume_base_offset = 0u64;

    for &seq in &seqs {
        let data = std::fs::read(segment_path(dir, seq))?;
        let mut offset = 0usize;
        let mut stopped = false;

        while offset < data.len() {
            match LogRecord::from_bytes(&data[offset..]) {
                Ok((record, lsn, consumed)) => {
                    let expected = base_offset + offset as u64;
                    if lsn.0 != expected {
                        return Err(TxnError::InvalidLog(format!(
                            "record at segment {seq} offset {offset} carries lsn {} but stream position is {expected}",
                            lsn.0
                        )));
                    }
                    records.push((lsn, record));
                    offset += consumed;
                }
                Err(RecordError::Truncated) => {
                    stop_reason = ReadStopReason::Truncated;
                    stopped = true;
                    break;
                }
                Err(_) => {
                    stop_reason = ReadStopReason::Corrupt;
                    stopped = true;
                    break;
                }
            }
        }

        resume_segment = seq;
        resume_offset_in_segment = offset as u64;
        resume_base_offset = base_offset;

        if stopped {
            break;
        }
        base_offset += data.len() as u64;
    }

    Ok(ReplayOutcome {
        records,
        stop_reason,
        resume_segment,
        resume_offset_in_segment,
        resume_base_offset,
    })
}
