//! The literal end-to-end scenarios: two transactions racing over a shared
//! region of the namespace, checked against the scope intersection table and
//! the snapshot-isolation commit rule.

use dirtxn::{DistinguishedName, SearchScope, TransactionManager, WalConfig};
use tempfile::tempdir;

fn dn(s: &str) -> DistinguishedName {
    DistinguishedName::parse(s).unwrap()
}

fn manager(path: &std::path::Path) -> TransactionManager {
    TransactionManager::open(path.join("wal"), WalConfig::for_testing()).unwrap()
}

#[test]
fn scenario_1_exclusive_write_write_conflict() {
    let dir = tempdir().unwrap();
    let mgr = manager(dir.path());

    let t1 = mgr.begin(false).unwrap();
    let t2 = mgr.begin(false).unwrap(); // begins before T1 commits

    let target = dn("cn=Test,ou=department,dc=example,dc=com");
    mgr.add_write(t1, target.clone(), SearchScope::Object).unwrap();
    mgr.commit(t1).unwrap();

    mgr.add_write(t2, target, SearchScope::Object).unwrap();
    let err = mgr.commit(t2).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn scenario_2_write_read_non_conflict_of_disjoint_dn() {
    let dir = tempdir().unwrap();
    let mgr = manager(dir.path());

    let dn1 = dn("cn=Test,ou=department,dc=example,dc=com");
    let t1 = mgr.begin(false).unwrap();
    mgr.add_write(t1, dn1.clone(), SearchScope::Object).unwrap();
    mgr.commit(t1).unwrap();

    let t2 = mgr.begin(false).unwrap(); // begins after T1's commit
    mgr.add_read(t2, dn1, SearchScope::Object).unwrap();
    assert!(mgr.commit(t2).is_ok());
}

#[test]
fn scenario_3_subtree_vs_object() {
    let dir = tempdir().unwrap();
    let mgr = manager(dir.path());

    let t1 = mgr.begin(false).unwrap();
    let t2 = mgr.begin(false).unwrap(); // concurrent, begun before T1 commits

    mgr.add_write(
        t1,
        dn("cn=Test,ou=department,dc=example,dc=com"),
        SearchScope::Subtree,
    )
    .unwrap();
    mgr.commit(t1).unwrap();

    mgr.add_write(
        t2,
        dn("gn=Test1,cn=Test,ou=department,dc=example,dc=com"),
        SearchScope::Object,
    )
    .unwrap();
    let err = mgr.commit(t2).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn scenario_4_subtree_vs_ancestor_write_does_not_conflict() {
    let dir = tempdir().unwrap();
    let mgr = manager(dir.path());

    let t1 = mgr.begin(false).unwrap();
    let t3 = mgr.begin(false).unwrap();

    mgr.add_write(
        t1,
        dn("cn=Test,ou=department,dc=example,dc=com"),
        SearchScope::Subtree,
    )
    .unwrap();
    mgr.commit(t1).unwrap();

    mgr.add_write(t3, dn("ou=department,dc=example,dc=com"), SearchScope::Object)
        .unwrap();
    assert!(mgr.commit(t3).is_ok());
}

#[test]
fn scenario_5_read_of_subtree_root_under_subtree_write_conflicts() {
    let dir = tempdir().unwrap();
    let mgr = manager(dir.path());

    let dn1 = dn("cn=Test,ou=department,dc=example,dc=com");
    let t1 = mgr.begin(false).unwrap();
    let t2 = mgr.begin(false).unwrap();

    mgr.add_write(t1, dn1.clone(), SearchScope::Subtree).unwrap();
    mgr.commit(t1).unwrap();

    mgr.add_read(t2, dn1, SearchScope::Subtree).unwrap();
    let err = mgr.commit(t2).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn scenario_6_wal_rollover_and_recovery() {
    let dir = tempdir().unwrap();
    let wal_dir = dir.path().join("wal");
    let config = WalConfig::new()
        .with_log_file_size(8192)
        .with_log_buffer_size(1024);

    {
        let mgr = TransactionManager::open(wal_dir.clone(), config.clone()).unwrap();
        for i in 0..200u64 {
            let txn = mgr.begin(false).unwrap();
            let target = dn(&format!("cn=user{i},ou=department,dc=example,dc=com"));
            mgr.add_write(txn, target, SearchScope::Object).unwrap();
            mgr.commit(txn).unwrap();
        }
    }

    let outcome = dirtxn_durability::replay(&wal_dir).unwrap();
    assert_eq!(outcome.stop_reason, dirtxn_durability::ReadStopReason::EndOfLog);

    let committed = outcome
        .records
        .iter()
        .filter(|(_, r)| matches!(r, dirtxn_durability::LogRecord::Commit { .. }))
        .count();
    assert_eq!(committed, 200);

    // the recovered manager's next transaction id must continue from 201
    let mgr = TransactionManager::open(wal_dir, config).unwrap();
    let next = mgr.begin(false).unwrap();
    assert_eq!(next.0, 201);
}
