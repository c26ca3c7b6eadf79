//! Transaction manager: begin/commit/abort lifecycle, serialized commits,
//! and the durable write-ahead log.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. Acquire the commit lock (serializes commits across all transactions)
//! 2. Find transactions committed since this transaction's start snapshot
//! 3. Check the committing transaction's read/write sets against each
//! 4. IF conflict: abort, append an Abort record, return Err
//! 5. Allocate a commit snapshot
//! 6. Append a Commit record to the WAL and fsync it (DURABILITY POINT)
//! 7. Move the transaction into committed history
//! 8. Release the commit lock
//! ```
//!
//! A transaction is only durable once its Commit record has been fsync'd;
//! a crash before that point means recovery will not see it as committed.

use crate::conflict::{find_conflict, is_concurrent_with};
use crate::transaction::Transaction;
use dashmap::DashMap;
use dirtxn_core::error::{Result, TxnError};
use dirtxn_core::types::{SnapshotId, TransactionId};
use dirtxn_durability::{LogRecord, LogWriter, WalConfig};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Coordinates transaction lifecycle: allocates ids and snapshots, tracks
/// active transactions, detects conflicts at commit time, and drives the
/// write-ahead log.
pub struct TransactionManager {
    next_txn_id: AtomicU64,
    next_snapshot_id: AtomicU64,
    active: DashMap<TransactionId, Transaction>,
    /// Transactions that have committed, retained so later commits can check
    /// conflicts against them. Entries whose commit snapshot predates every
    /// active transaction's start snapshot are pruned on each commit.
    committed: Mutex<Vec<Transaction>>,
    /// Serializes the validate-then-append-then-apply sequence so no two
    /// commits can interleave their conflict checks.
    commit_lock: Mutex<()>,
    wal: Mutex<LogWriter>,
}

impl TransactionManager {
    /// Open (or recover) the manager's write-ahead log under `wal_dir` and
    /// start a fresh manager with no active transactions.
    ///
    /// Snapshot ids resume from one past the highest commit snapshot found
    /// in the log, so recovered commit order is preserved; transaction ids
    /// resume from one past the highest transaction id seen.
    pub fn open(wal_dir: PathBuf, config: WalConfig) -> Result<Self> {
        let wal = LogWriter::open(wal_dir.clone(), config)?;
        let outcome = dirtxn_durability::replay(&wal_dir)?;

        let mut max_txn_id = 0u64;
        let mut max_snapshot = 0u64;
        for (_, record) in &outcome.records {
            max_txn_id = max_txn_id.max(record.txn_id().0);
            match record {
                LogRecord::Begin { start_snapshot, .. } => {
                    max_snapshot = max_snapshot.max(*start_snapshot);
                }
                LogRecord::Commit { commit_snapshot, .. } => {
                    max_snapshot = max_snapshot.max(*commit_snapshot);
                }
                _ => {}
            }
        }

        Ok(TransactionManager {
            next_txn_id: AtomicU64::new(max_txn_id + 1),
            next_snapshot_id: AtomicU64::new(max_snapshot + 1),
            active: DashMap::new(),
            committed: Mutex::new(Vec::new()),
            commit_lock: Mutex::new(()),
            wal: Mutex::new(wal),
        })
    }

    fn allocate_txn_id(&self) -> TransactionId {
        TransactionId(self.next_txn_id.fetch_add(1, Ordering::SeqCst))
    }

    fn allocate_snapshot_id(&self) -> SnapshotId {
        SnapshotId(self.next_snapshot_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Start a new transaction, recording its `Begin` record in the WAL. A
    /// `read_only` transaction may still record reads for conflict checking
    /// but `add_write` will reject any write against it with
    /// [`TxnError::ReadOnlyTxn`]. The record is buffered but not fsynced;
    /// only commit durability is guaranteed synchronously.
    pub fn begin(&self, read_only: bool) -> Result<TransactionId> {
        let txn_id = self.allocate_txn_id();
        let start_snapshot = self.allocate_snapshot_id();
        let mut txn = Transaction::begin(txn_id, start_snapshot, read_only);

        let lsn = self.wal.lock().append(&LogRecord::Begin {
            txn_id,
            start_snapshot: start_snapshot.0,
        })?;
        txn.set_begin_lsn(lsn);

        tracing::debug!(%txn_id, %start_snapshot, "transaction began");
        self.active.insert(txn_id, txn);
        Ok(txn_id)
    }

    /// Record that `txn_id` read `(dn, scope)`.
    pub fn add_read(
        &self,
        txn_id: TransactionId,
        dn: dirtxn_core::dn::DistinguishedName,
        scope: dirtxn_core::scope::SearchScope,
    ) -> Result<()> {
        let mut entry = self
            .active
            .get_mut(&txn_id)
            .ok_or(TxnError::NoCurrentTxn)?;
        if !entry.is_active() {
            return Err(TxnError::NotActive("not active"));
        }
        entry.reads_mut().add(dn, scope);
        Ok(())
    }

    /// Record that `txn_id` wrote `(dn, scope)`.
    pub fn add_write(
        &self,
        txn_id: TransactionId,
        dn: dirtxn_core::dn::DistinguishedName,
        scope: dirtxn_core::scope::SearchScope,
    ) -> Result<()> {
        let mut entry = self
            .active
            .get_mut(&txn_id)
            .ok_or(TxnError::NoCurrentTxn)?;
        if !entry.is_active() {
            return Err(TxnError::NotActive("not active"));
        }
        if entry.is_read_only() {
            return Err(TxnError::ReadOnlyTxn);
        }
        entry.writes_mut().add(dn, scope);
        Ok(())
    }

    /// Append an opaque user-data payload to `txn_id`'s WAL span, without
    /// touching its read/write sets.
    pub fn log_user_data(&self, txn_id: TransactionId, payload: Vec<u8>) -> Result<()> {
        if !self
            .active
            .get(&txn_id)
            .map(|t| t.is_active())
            .unwrap_or(false)
        {
            return Err(TxnError::NoCurrentTxn);
        }
        self.wal.lock().append(&LogRecord::UserData { txn_id, payload })?;
        Ok(())
    }

    /// Validate and commit `txn_id`. Returns the assigned commit snapshot on
    /// success, or [`TxnError::Conflict`] if a concurrently committed
    /// transaction's write set overlapped this transaction's reads or
    /// writes — the caller should retry the transaction from scratch.
    pub fn commit(&self, txn_id: TransactionId) -> Result<SnapshotId> {
        let _guard = self.commit_lock.lock();

        let (_, mut txn) = self
            .active
            .remove(&txn_id)
            .ok_or(TxnError::NoCurrentTxn)?;
        if !txn.is_active() {
            return Err(TxnError::NotActive("not active"));
        }

        let committed = self.committed.lock();
        let concurrent: Vec<&Transaction> = committed
            .iter()
            .filter(|c| is_concurrent_with(txn.start_snapshot(), c.commit_snapshot().unwrap()))
            .collect();
        let conflict = find_conflict(&txn, concurrent.iter().copied());
        drop(committed);

        if let Some(conflict) = conflict {
            txn.mark_aborted();
            let lsn = self.wal.lock().append(&LogRecord::Abort { txn_id })?;
            txn.set_end_lsn(lsn);
            self.wal.lock().sync()?;
            tracing::info!(%txn_id, with = %conflict.with, kind = ?conflict.kind, "transaction aborted on conflict");
            return Err(TxnError::Conflict(format!(
                "{:?} with {}",
                conflict.kind, conflict.with
            )));
        }

        let commit_snapshot = self.allocate_snapshot_id();
        let mut wal = self.wal.lock();
        let lsn = wal.append(&LogRecord::Commit {
            txn_id,
            commit_snapshot: commit_snapshot.0,
        })?;
        wal.sync()?;
        drop(wal);

        txn.set_end_lsn(lsn);
        txn.mark_committed(commit_snapshot);

        let floor = committed_clone_min_start(&self.active);
        let mut committed = self.committed.lock();
        committed.push(txn);
        if let Some(floor) = floor {
            committed.retain(|c| c.commit_snapshot().unwrap().0 > floor.0);
        }
        tracing::debug!(%txn_id, %commit_snapshot, "transaction committed");
        Ok(commit_snapshot)
    }

    /// Abort `txn_id` without committing, recording an `Abort` record.
    pub fn abort(&self, txn_id: TransactionId) -> Result<()> {
        let (_, mut txn) = self
            .active
            .remove(&txn_id)
            .ok_or(TxnError::NoCurrentTxn)?;
        if !txn.is_active() {
            return Err(TxnError::NotActive("not active"));
        }
        txn.mark_aborted();
        let mut wal = self.wal.lock();
        let lsn = wal.append(&LogRecord::Abort { txn_id })?;
        wal.sync()?;
        txn.set_end_lsn(lsn);
        tracing::debug!(%txn_id, "transaction aborted by caller");
        Ok(())
    }
}

fn committed_clone_min_start(active: &DashMap<TransactionId, Transaction>) -> Option<SnapshotId> {
    active.iter().map(|e| e.start_snapshot()).min()
}
