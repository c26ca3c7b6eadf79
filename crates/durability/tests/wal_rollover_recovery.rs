//! End-to-end segment rollover and crash-recovery behavior for `LogWriter`.

use dirtxn_core::types::TransactionId;
use dirtxn_durability::{replay, LogRecord, LogWriter, ReadStopReason, WalConfig};
use tempfile::tempdir;

#[test]
fn crash_mid_record_truncates_on_reopen_and_preserves_earlier_commits() {
    let dir = tempdir().unwrap();
    let wal_dir = dir.path().join("wal");
    let config = WalConfig::for_testing();

    {
        let mut writer = LogWriter::open(wal_dir.clone(), config.clone()).unwrap();
        writer
            .append(&LogRecord::Begin {
                txn_id: TransactionId(1),
                start_snapshot: 0,
            })
            .unwrap();
        writer
            .append(&LogRecord::Commit {
                txn_id: TransactionId(1),
                commit_snapshot: 1,
            })
            .unwrap();
        writer.sync().unwrap();

        // simulate a torn write: append a record but never sync it fully to disk
        writer
            .append(&LogRecord::Begin {
                txn_id: TransactionId(2),
                start_snapshot: 1,
            })
            .unwrap();
        writer.flush().unwrap();
    }

    // chop the last few bytes off the active segment to simulate a crash
    // mid-write of the second Begin record.
    let segments = dirtxn_durability::list_segment_numbers(&wal_dir).unwrap();
    let last_seg = *segments.last().unwrap();
    let path = dirtxn_durability::segment_path(&wal_dir, last_seg);
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, &bytes).unwrap();

    let outcome = replay(&wal_dir).unwrap();
    assert_eq!(outcome.stop_reason, ReadStopReason::Truncated);
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome
        .records
        .iter()
        .any(|(_, r)| matches!(r, LogRecord::Commit { txn_id, .. } if *txn_id == TransactionId(1))));

    // reopening must discard the torn record and let new appends proceed
    // cleanly from the last valid commit.
    let mut writer = LogWriter::open(wal_dir.clone(), config).unwrap();
    writer
        .append(&LogRecord::Begin {
            txn_id: TransactionId(3),
            start_snapshot: 2,
        })
        .unwrap();
    writer.sync().unwrap();

    let outcome = replay(&wal_dir).unwrap();
    assert_eq!(outcome.stop_reason, ReadStopReason::EndOfLog);
    assert_eq!(outcome.records.len(), 3);
}

#[test]
fn many_small_records_roll_over_multiple_segments_and_replay_in_order() {
    let dir = tempdir().unwrap();
    let wal_dir = dir.path().join("wal");
    let config = WalConfig::new()
        .with_log_file_size(64)
        .with_log_buffer_size(16);

    {
        let mut writer = LogWriter::open(wal_dir.clone(), config).unwrap();
        for i in 0..20u64 {
            writer
                .append(&LogRecord::Begin {
                    txn_id: TransactionId(i),
                    start_snapshot: i,
                })
                .unwrap();
        }
        writer.sync().unwrap();
    }

    let segments = dirtxn_durability::list_segment_numbers(&wal_dir).unwrap();
    assert!(segments.len() > 1);

    let outcome = replay(&wal_dir).unwrap();
    assert_eq!(outcome.stop_reason, ReadStopReason::EndOfLog);
    assert_eq!(outcome.records.len(), 20);
    for (expected, (_, record)) in (0u64..20).zip(outcome.records.iter()) {
        match record {
            LogRecord::Begin { txn_id, .. } => assert_eq!(*txn_id, TransactionId(expected)),
            other => panic!("unexpected record {other:?}"),
        }
    }
    let lsns: Vec<u64> = outcome.records.iter().map(|(lsn, _)| lsn.0).collect();
    assert!(lsns.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn user_data_record_survives_round_trip_through_replay() {
    let dir = tempdir().unwrap();
    let wal_dir = dir.path().join("wal");
    let mut writer = LogWriter::open(wal_dir.clone(), WalConfig::for_testing()).unwrap();

    writer
        .append(&LogRecord::Begin {
            txn_id: TransactionId(1),
            start_snapshot: 0,
        })
        .unwrap();
    writer
        .append(&LogRecord::UserData {
            txn_id: TransactionId(1),
            payload: b"cn=test,dc=example,dc=com".to_vec(),
        })
        .unwrap();
    writer
        .append(&LogRecord::Commit {
            txn_id: TransactionId(1),
            commit_snapshot: 1,
        })
        .unwrap();
    writer.sync().unwrap();

    let outcome = replay(&wal_dir).unwrap();
    assert_eq!(outcome.records.len(), 3);
    match &outcome.records[1].1 {
        LogRecord::UserData { payload, .. } => {
            assert_eq!(payload, b"cn=test,dc=example,dc=com");
        }
        other => panic!("unexpected record {other:?}"),
    }
}
