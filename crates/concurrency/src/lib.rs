//! Concurrency layer: transaction lifecycle, conflict detection, and the
//! transaction manager that drives both against the durable write-ahead log.
//!
//! - [`Transaction`] / [`TransactionState`]: the per-transaction record and
//!   its Active/Committed/Aborted state machine.
//! - [`conflict`]: snapshot-isolation-style write-write/read-write conflict
//!   detection between a committing transaction and concurrent committers.
//! - [`TransactionManager`]: begin/commit/abort orchestration, serialized
//!   commits, and WAL durability.
//! - [`LogManager`]: thin façade for external operation handlers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conflict;
pub mod log_manager;
pub mod manager;
pub mod transaction;

pub use conflict::{Conflict, ConflictKind};
pub use log_manager::LogManager;
pub use manager::TransactionManager;
pub use transaction::{LogSpan, Transaction, TransactionState};
