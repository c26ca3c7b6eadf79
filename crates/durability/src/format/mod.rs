//! On-disk byte format for the write-ahead log.
//!
//! Keeping serialization separate from the writer/reader's operational
//! logic (buffering, rollover, fsync policy) makes the wire format easy to
//! reason about and test in isolation.

pub mod record;

pub use record::{LogRecord, RecordError};
