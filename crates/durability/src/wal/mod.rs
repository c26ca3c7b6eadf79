//! Write-ahead log module.
//!
//! - `config`: segment size / buffer size configuration
//! - `segment`: segment file naming and directory scanning
//! - `writer`: segmented, buffered, fsync'd `LogWriter`
//! - `reader`: crash-recovery replay

pub mod config;
pub mod reader;
pub mod segment;
pub mod writer;

pub use config::{WalConfig, WalConfigError};
pub use reader::{replay, ReadStopReason, ReplayOutcome};
pub use segment::{list_segment_numbers, segment_path};
pub use writer::LogWriter;
