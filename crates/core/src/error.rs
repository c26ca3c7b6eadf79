//! Error types for the transaction core
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations,
//! the same convention used across the other crates in this workspace.

use thiserror::Error;

/// Result type alias used throughout the transaction core.
pub type Result<T> = std::result::Result<T, TxnError>;

/// Unified error type for the transactional conflict-detection core.
///
/// Every public operation in this workspace returns `Result<T, TxnError>`
/// (aliased as [`Result`]). Variants are grouped by where they originate:
/// DN syntax, transaction lifecycle, conflict detection, and the log.
#[derive(Debug, Error)]
pub enum TxnError {
    /// A distinguished name string did not parse.
    #[error("invalid DN syntax: {0}")]
    InvalidSyntax(String),

    /// An operation required an active transaction for the calling thread,
    /// but none was registered.
    #[error("no active transaction for this caller")]
    NoCurrentTxn,

    /// The calling thread already has an active transaction; `begin` does
    /// not support nesting.
    #[error("caller already has an active transaction")]
    TxnAlreadyActive,

    /// An operation was attempted against a transaction that is no longer
    /// in the `Active` state.
    #[error("transaction is not active (state: {0})")]
    NotActive(&'static str),

    /// `addWrite` was called on a transaction opened read-only.
    #[error("cannot write in a read-only transaction")]
    ReadOnlyTxn,

    /// The transaction's read-set or write-set conflicted with a concurrently
    /// committed transaction; the caller must retry.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// Fatal framing, checksum, or ordering violation found during WAL
    /// replay; refuse to start rather than open against a log in this state.
    #[error("log error: {0}")]
    InvalidLog(String),

    /// An I/O error occurred while reading or writing the log.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TxnError {
    /// True for errors that indicate the caller should retry the transaction
    /// from scratch (conflicts), as opposed to errors that indicate caller
    /// misuse or unrecoverable storage failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TxnError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_syntax() {
        let e = TxnError::InvalidSyntax("unterminated quote".to_string());
        assert!(e.to_string().contains("invalid DN syntax"));
    }

    #[test]
    fn display_conflict() {
        let e = TxnError::Conflict("write-write on cn=a,dc=com".to_string());
        assert!(e.to_string().contains("transaction conflict"));
    }

    #[test]
    fn display_invalid_log() {
        let e = TxnError::InvalidLog("lsn out of order".to_string());
        assert!(e.to_string().contains("log error"));
        assert!(!e.is_retryable());
    }

    #[test]
    fn is_retryable_only_for_conflict() {
        assert!(TxnError::Conflict("x".to_string()).is_retryable());
        assert!(!TxnError::NoCurrentTxn.is_retryable());
        assert!(!TxnError::TxnAlreadyActive.is_retryable());
        assert!(!TxnError::NotActive("aborted").is_retryable());
        assert!(!TxnError::ReadOnlyTxn.is_retryable());
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing segment");
        let e: TxnError = io_err.into();
        assert!(matches!(e, TxnError::Io(_)));
    }
}
