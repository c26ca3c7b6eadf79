//! On-disk log record format.
//!
//! # Record Layout
//!
//! ```text
//! ┌────────────┬────────────┬─────────┬──────────────────┬───────────┐
//! │ length (4) │ lsn (8)    │ kind (1)│ payload (var)     │ crc32 (4) │
//! └────────────┴────────────┴─────────┴──────────────────┴───────────┘
//! ```
//!
//! All multi-byte fields are big-endian. `length` is the size in bytes of
//! `payload` alone; `lsn`, `kind`, and `payload` together are covered by the
//! trailing `crc32` (IEEE 802.3 polynomial, via `crc32fast`). `lsn` is the
//! byte offset of this record's first byte (the `length` field) within the
//! logical log stream spanning every segment.

use dirtxn_core::types::{Lsn, TransactionId};

/// Tag byte identifying a [`LogRecord`] variant on disk.
const KIND_BEGIN: u8 = 0;
const KIND_USER_DATA: u8 = 1;
const KIND_COMMIT: u8 = 2;
const KIND_ABORT: u8 = 3;

/// A single write-ahead log record.
///
/// Every non-`Begin` record for a transaction is preceded in file order by
/// that transaction's `Begin`; the trailing record for a transaction is
/// exactly one of `Commit` or `Abort`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Marks the start of a transaction.
    Begin {
        /// Transaction that began.
        txn_id: TransactionId,
        /// Snapshot id the transaction started at.
        start_snapshot: u64,
    },
    /// Opaque caller-supplied payload attached to a transaction.
    UserData {
        /// Owning transaction.
        txn_id: TransactionId,
        /// Caller-supplied bytes, uninterpreted by the core.
        payload: Vec<u8>,
    },
    /// Marks a transaction committed.
    Commit {
        /// Transaction that committed.
        txn_id: TransactionId,
        /// Snapshot id assigned at commit.
        commit_snapshot: u64,
    },
    /// Marks a transaction aborted.
    Abort {
        /// Transaction that aborted.
        txn_id: TransactionId,
    },
}

impl LogRecord {
    /// The transaction this record belongs to.
    pub fn txn_id(&self) -> TransactionId {
        match self {
            LogRecord::Begin { txn_id, .. } => *txn_id,
            LogRecord::UserData { txn_id, .. } => *txn_id,
            LogRecord::Commit { txn_id, .. } => *txn_id,
            LogRecord::Abort { txn_id } => *txn_id,
        }
    }

    /// True for the two terminal record kinds.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LogRecord::Commit { .. } | LogRecord::Abort { .. })
    }

    fn kind_byte(&self) -> u8 {
        match self {
            LogRecord::Begin { .. } => KIND_BEGIN,
            LogRecord::UserData { .. } => KIND_USER_DATA,
            LogRecord::Commit { .. } => KIND_COMMIT,
            LogRecord::Abort { .. } => KIND_ABORT,
        }
    }

    fn encode_payload(&self) -> Vec<u8> {
        match self {
            LogRecord::Begin {
                txn_id,
                start_snapshot,
            } => {
                let mut buf = Vec::with_capacity(16);
                buf.extend_from_slice(&txn_id.0.to_be_bytes());
                buf.extend_from_slice(&start_snapshot.to_be_bytes());
                buf
            }
            LogRecord::UserData { txn_id, payload } => {
                let mut buf = Vec::with_capacity(8 + payload.len());
                buf.extend_from_slice(&txn_id.0.to_be_bytes());
                buf.extend_from_slice(payload);
                buf
            }
            LogRecord::Commit {
                txn_id,
                commit_snapshot,
            } => {
                let mut buf = Vec::with_capacity(16);
                buf.extend_from_slice(&txn_id.0.to_be_bytes());
                buf.extend_from_slice(&commit_snapshot.to_be_bytes());
                buf
            }
            LogRecord::Abort { txn_id } => txn_id.0.to_be_bytes().to_vec(),
        }
    }

    /// Serialize this record at log sequence number `lsn`.
    pub fn to_bytes(&self, lsn: Lsn) -> Vec<u8> {
        let payload = self.encode_payload();
        let mut crc_input = Vec::with_capacity(8 + 1 + payload.len());
        crc_input.extend_from_slice(&lsn.0.to_be_bytes());
        crc_input.push(self.kind_byte());
        crc_input.extend_from_slice(&payload);
        let crc = compute_crc(&crc_input);

        let mut out = Vec::with_capacity(4 + crc_input.len() + 4);
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&crc_input);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }

    /// Parse one record from the front of `bytes`.
    ///
    /// Returns the record, its LSN, and the number of bytes consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, Lsn, usize), RecordError> {
        if bytes.len() < 4 {
            return Err(RecordError::Truncated);
        }
        let length = u32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let total = 4 + 8 + 1 + length + 4;
        if bytes.len() < total {
            return Err(RecordError::Truncated);
        }

        let crc_input = &bytes[4..4 + 8 + 1 + length];
        let stored_crc = u32::from_be_bytes(bytes[total - 4..total].try_into().unwrap());
        let computed_crc = compute_crc(crc_input);
        if computed_crc != stored_crc {
            return Err(RecordError::ChecksumMismatch {
                expected: stored_crc,
                computed: computed_crc,
            });
        }

        let lsn = Lsn(u64::from_be_bytes(crc_input[0..8].try_into().unwrap()));
        let kind = crc_input[8];
        let payload = &crc_input[9..];

        let record = match kind {
            KIND_BEGIN => {
                if payload.len() != 16 {
                    return Err(RecordError::InvalidFormat);
                }
                LogRecord::Begin {
                    txn_id: TransactionId(u64::from_be_bytes(payload[0..8].try_into().unwrap())),
                    start_snapshot: u64::from_be_bytes(payload[8..16].try_into().unwrap()),
                }
            }
            KIND_USER_DATA => {
                if payload.len() < 8 {
                    return Err(RecordError::InvalidFormat);
                }
                LogRecord::UserData {
                    txn_id: TransactionId(u64::from_be_bytes(payload[0..8].try_into().unwrap())),
                    payload: payload[8..].to_vec(),
                }
            }
            KIND_COMMIT => {
                if payload.len() != 16 {
                    return Err(RecordError::InvalidFormat);
                }
                LogRecord::Commit {
                    txn_id: TransactionId(u64::from_be_bytes(payload[0..8].try_into().unwrap())),
                    commit_snapshot: u64::from_be_bytes(payload[8..16].try_into().unwrap()),
                }
            }
            KIND_ABORT => {
                if payload.len() != 8 {
                    return Err(RecordError::InvalidFormat);
                }
                LogRecord::Abort {
                    txn_id: TransactionId(u64::from_be_bytes(payload[0..8].try_into().unwrap())),
                }
            }
            other => return Err(RecordError::UnknownKind(other)),
        };

        Ok((record, lsn, total))
    }
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Failures when parsing a [`LogRecord`] from bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Not enough bytes remain to hold a complete record.
    #[error("truncated record")]
    Truncated,
    /// The record's declared shape doesn't match its kind.
    #[error("malformed record payload")]
    InvalidFormat,
    /// The trailing CRC32 didn't match the computed checksum.
    #[error("checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// CRC32 stored in the record.
        expected: u32,
        /// CRC32 computed from the record's bytes.
        computed: u32,
    },
    /// The kind byte did not match any known record variant.
    #[error("unknown record kind {0}")]
    UnknownKind(u8),
}
