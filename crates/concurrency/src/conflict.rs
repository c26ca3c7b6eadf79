//! Snapshot-isolation-style conflict detection between a committing
//! transaction and the transactions that committed after it started.
//!
//! A committing transaction T conflicts with a concurrently committed
//! transaction C (one whose commit snapshot falls after T's start snapshot)
//! if either of T's read or write sets overlaps C's write set under the
//! scope intersection table. This is the standard first-committer-wins rule:
//! only C's *writes* matter, since C's reads never produce visible state for
//! T to conflict against.

use crate::transaction::Transaction;
use dirtxn_core::types::SnapshotId;

/// Which side of the detected overlap was T's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// T wrote a region that a concurrent committer also wrote.
    WriteWrite,
    /// T read a region that a concurrent committer wrote.
    ReadWrite,
}

/// A confirmed conflict between the committing transaction and one that
/// committed concurrently.
#[derive(Debug, Clone, Copy)]
pub struct Conflict {
    /// Which combination of sets overlapped.
    pub kind: ConflictKind,
    /// Id of the transaction T conflicted with.
    pub with: dirtxn_core::types::TransactionId,
}

/// Check `candidate` (about to commit) against every transaction in
/// `committed_since`, which must already be filtered to transactions whose
/// commit snapshot is greater than `candidate`'s start snapshot.
///
/// Returns the first conflict found, preferring write-write over read-write
/// when a single concurrent transaction trips both (write-write is cheaper to
/// explain to a caller and is checked first per transaction).
pub fn find_conflict<'a>(
    candidate: &Transaction,
    committed_since: impl IntoIterator<Item = &'a Transaction>,
) -> Option<Conflict> {
    for other in committed_since {
        debug_assert!(other.commit_snapshot().is_some());
        if candidate.writes().intersects(other.writes()) {
            return Some(Conflict {
                kind: ConflictKind::WriteWrite,
                with: other.id(),
            });
        }
        if candidate.reads().intersects(other.writes()) {
            return Some(Conflict {
                kind: ConflictKind::ReadWrite,
                with: other.id(),
            });
        }
    }
    None
}

/// True iff `snapshot` committed after `start`, i.e. it is concurrent with a
/// transaction that began at `start` and is only now validating its commit.
pub fn is_concurrent_with(start: SnapshotId, commit_snapshot: SnapshotId) -> bool {
    commit_snapshot.0 > start.0
}
