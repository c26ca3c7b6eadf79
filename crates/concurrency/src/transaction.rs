//! Transaction record: identity, lifecycle state, and the read/write sets a
//! commit is validated against.

use dirtxn_core::scoped_set::ScopedSet;
use dirtxn_core::types::{Lsn, SnapshotId, TransactionId};

/// Lifecycle state of a [`Transaction`]. Terminal states (`Committed`,
/// `Aborted`) are final; there is no intermediate "validating" state visible
/// to callers, since validation and commit happen atomically under the
/// manager's commit lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// The transaction is open and may still record reads and writes.
    Active,
    /// The transaction committed; its write set is now visible to later
    /// transactions' conflict checks.
    Committed,
    /// The transaction aborted; its read and write sets are discarded.
    Aborted,
}

/// Span of WAL records belonging to a transaction: the LSN of its `Begin`
/// record, and the LSN of its terminal `Commit`/`Abort` record once assigned.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpan {
    /// LSN of the `Begin` record, if the transaction has produced WAL
    /// output yet.
    pub begin_lsn: Option<Lsn>,
    /// LSN of the terminal `Commit` or `Abort` record.
    pub end_lsn: Option<Lsn>,
}

/// An in-progress or finished transaction: identity, lifecycle state,
/// snapshot ids, read/write sets, and the span of WAL records it produced.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    /// Whether this transaction may record writes.
    read_only: bool,
    /// Snapshot the transaction observed at `begin`.
    start_snapshot: SnapshotId,
    /// Snapshot assigned at `commit`, if committed.
    commit_snapshot: Option<SnapshotId>,
    reads: ScopedSet,
    writes: ScopedSet,
    log_span: LogSpan,
}

impl Transaction {
    /// Start a new, empty transaction at `start_snapshot`.
    pub fn begin(id: TransactionId, start_snapshot: SnapshotId, read_only: bool) -> Self {
        Transaction {
            id,
            state: TransactionState::Active,
            read_only,
            start_snapshot,
            commit_snapshot: None,
            reads: ScopedSet::new(),
            writes: ScopedSet::new(),
            log_span: LogSpan::default(),
        }
    }

    /// This transaction's id.
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Whether this transaction was opened read-only and must reject writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// True if the transaction is still open.
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Snapshot observed at `begin`.
    pub fn start_snapshot(&self) -> SnapshotId {
        self.start_snapshot
    }

    /// Snapshot assigned at commit, if any.
    pub fn commit_snapshot(&self) -> Option<SnapshotId> {
        self.commit_snapshot
    }

    /// The transaction's accumulated read set.
    pub fn reads(&self) -> &ScopedSet {
        &self.reads
    }

    /// The transaction's accumulated write set.
    pub fn writes(&self) -> &ScopedSet {
        &self.writes
    }

    /// The transaction's WAL record span.
    pub fn log_span(&self) -> LogSpan {
        self.log_span
    }

    /// Record that `begin_lsn` was assigned to this transaction's `Begin`
    /// record.
    pub fn set_begin_lsn(&mut self, lsn: Lsn) {
        self.log_span.begin_lsn = Some(lsn);
    }

    /// Record the LSN of the transaction's terminal record.
    pub fn set_end_lsn(&mut self, lsn: Lsn) {
        self.log_span.end_lsn = Some(lsn);
    }

    /// Mutably access the read set, for recording an `addRead`. Callers
    /// must check [`Transaction::is_active`] first; this panics otherwise.
    pub fn reads_mut(&mut self) -> &mut ScopedSet {
        assert!(
            self.is_active(),
            "cannot record a read on a finished transaction"
        );
        &mut self.reads
    }

    /// Mutably access the write set, for recording an `addWrite`. Panics if
    /// the transaction is not active or is read-only; callers must check
    /// [`Transaction::is_active`] and [`Transaction::is_read_only`] first.
    pub fn writes_mut(&mut self) -> &mut ScopedSet {
        assert!(
            self.is_active(),
            "cannot record a write on a finished transaction"
        );
        assert!(!self.read_only, "cannot record a write on a read-only transaction");
        &mut self.writes
    }

    /// Transition to `Committed` at `commit_snapshot`.
    pub fn mark_committed(&mut self, commit_snapshot: SnapshotId) {
        self.state = TransactionState::Committed;
        self.commit_snapshot = Some(commit_snapshot);
    }

    /// Transition to `Aborted`.
    pub fn mark_aborted(&mut self) {
        self.state = TransactionState::Aborted;
    }
}
