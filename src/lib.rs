//! # dirtxn
//!
//! Transactional conflict-detection core for an LDAP-compatible directory
//! service: distinguished names, scope-aware read/write sets, a segmented
//! write-ahead log, and a snapshot-isolation transaction manager.
//!
//! ```no_run
//! use dirtxn::{DistinguishedName, SearchScope, TransactionManager, WalConfig};
//!
//! fn main() -> dirtxn::Result<()> {
//!     let mgr = TransactionManager::open("./data/wal".into(), WalConfig::default())?;
//!     let txn = mgr.begin(false)?;
//!     let dn = DistinguishedName::parse("cn=Test,dc=example,dc=com")?;
//!     mgr.add_write(txn, dn, SearchScope::Object)?;
//!     mgr.commit(txn)?;
//!     Ok(())
//! }
//! ```
//!
//! This crate covers only the conflict-detection and durability core: LDAP
//! wire protocol, authentication, schema management, and partition storage
//! live outside it.

pub use dirtxn_core::dn::{DistinguishedName, Rdn};
pub use dirtxn_core::error::{Result, TxnError};
pub use dirtxn_core::scope::{scopes_match, SearchScope};
pub use dirtxn_core::scoped_set::{ScopedEntry, ScopedSet};
pub use dirtxn_core::types::{Lsn, OpKind, SnapshotId, TransactionId};

pub use dirtxn_durability::{LogRecord, RecordError, WalConfig, WalConfigError};

pub use dirtxn_concurrency::{
    Conflict, ConflictKind, LogManager, LogSpan, Transaction, TransactionManager, TransactionState,
};
