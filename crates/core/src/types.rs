//! Small newtype identifiers shared across the transaction core.

use std::fmt;

/// A monotonically increasing transaction identifier, assigned at `begin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn#{}", self.0)
    }
}

/// A monotonically increasing snapshot marker. Distinct from
/// [`TransactionId`] so read-only callers can take a snapshot without
/// consuming a transaction id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snap#{}", self.0)
    }
}

/// Log sequence number: the byte offset of a record's first byte within the
/// whole logical log stream (segment-local offset plus the segment's start
/// offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lsn(pub u64);

impl fmt::Display for Lsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lsn#{}", self.0)
    }
}

/// Tag describing what kind of directory operation touched a `(dn, scope)`
/// region. The conflict-detection core only needs the target DN and
/// effective scope; `OpKind` exists so operation handlers can record *why*
/// a region was touched without the core needing to understand LDAP
/// semantics beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Entry addition.
    Add,
    /// Attribute modification.
    Modify,
    /// Entry deletion.
    Delete,
    /// Rename / move (`modifyDN`).
    ModifyDn,
    /// Search request.
    Search,
    /// Bind (authentication) request.
    Bind,
}
