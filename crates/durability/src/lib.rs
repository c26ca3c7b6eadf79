//! Durability layer.
//!
//! Everything that touches disk for the transactional core: the on-disk
//! record format and the segmented write-ahead log built on top of it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod wal;

pub use format::{LogRecord, RecordError};
pub use wal::{
    list_segment_numbers, replay, segment_path, LogWriter, ReadStopReason, ReplayOutcome,
    WalConfig, WalConfigError,
};
