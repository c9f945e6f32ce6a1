//! Behavioral tests for the ledger over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use crowdmap_ledger::{Ledger, LedgerError, MemoryLedgerStore};
use crowdmap_types::{ChangeKind, ChangeSubmission, Direction, ReporterSet};

fn ledger() -> Ledger<MemoryLedgerStore> {
    Ledger::new(MemoryLedgerStore::new())
}

fn exit(room_number: i32, destination: i32) -> ChangeKind {
    ChangeKind::ModifyExit {
        room_number,
        direction: Direction::North,
        destination,
    }
}

#[tokio::test]
async fn identical_payloads_from_two_reporters_make_one_record() {
    let ledger = ledger();
    ledger
        .submit(ChangeSubmission::new(exit(1, 2), "alice"))
        .await
        .unwrap();
    ledger
        .submit(ChangeSubmission::new(exit(1, 2), "bob"))
        .await
        .unwrap();

    let changes = ledger.get_changes(0, &[], &[]).await.unwrap();
    assert_eq!(changes.len(), 1);
    let reporters = &changes.first().unwrap().reporters;
    assert!(reporters.contains("alice"));
    assert!(reporters.contains("bob"));
}

#[tokio::test]
async fn same_reporter_twice_counts_once() {
    let ledger = ledger();
    for _ in 0..2 {
        ledger
            .submit(ChangeSubmission::new(exit(1, 2), "alice"))
            .await
            .unwrap();
    }
    let changes = ledger.get_changes(0, &[], &[]).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes.first().unwrap().times_seen(), 1);
}

#[tokio::test]
async fn threshold_filters_by_reporter_count() {
    let ledger = ledger();
    ledger
        .add_change(exit(1, 2), ReporterSet::single("alice"))
        .await
        .unwrap();
    let vetted = ledger
        .add_change(exit(3, 4), ["alice", "bob"].into_iter().collect())
        .await
        .unwrap();

    let changes = ledger.get_changes(2, &[], &[]).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes.first().unwrap().change_id, vetted.change_id());
}

#[tokio::test]
async fn include_and_exclude_are_mutually_exclusive() {
    let ledger = ledger();
    let a = ledger
        .add_change(exit(1, 2), ReporterSet::single("alice"))
        .await
        .unwrap()
        .change_id();
    let b = ledger
        .add_change(exit(2, 3), ReporterSet::single("alice"))
        .await
        .unwrap()
        .change_id();

    let err = ledger.get_changes(0, &[a], &[b]).await.unwrap_err();
    assert!(matches!(err, LedgerError::ConflictingFilters));
    assert!(err.is_validation());

    let included = ledger.get_changes(0, &[a], &[]).await.unwrap();
    assert_eq!(included.len(), 1);
    assert_eq!(included.first().unwrap().change_id, a);

    let excluded = ledger.get_changes(0, &[], &[a]).await.unwrap();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded.first().unwrap().change_id, b);
}

#[tokio::test]
async fn invalid_submission_never_reaches_the_store() {
    let ledger = ledger();
    let err = ledger
        .submit(ChangeSubmission::new(exit(1, 2), "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Invalid(_)));
    assert!(ledger.store().is_empty().await);
}

#[tokio::test]
async fn retire_removes_only_named_changes() {
    let ledger = ledger();
    let a = ledger
        .add_change(exit(1, 2), ReporterSet::single("alice"))
        .await
        .unwrap()
        .change_id();
    let b = ledger
        .add_change(exit(2, 3), ReporterSet::single("alice"))
        .await
        .unwrap()
        .change_id();

    assert_eq!(ledger.retire(&[a]).await.unwrap(), 1);
    assert_eq!(ledger.retire(&[a]).await.unwrap(), 0);
    assert_eq!(ledger.retire(&[]).await.unwrap(), 0);

    let remaining = ledger.get_changes(0, &[], &[]).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining.first().unwrap().change_id, b);
}

#[tokio::test]
async fn concurrent_identical_submissions_merge() {
    let ledger = Arc::new(ledger());
    let mut handles = Vec::new();
    for n in 0..32 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .submit(ChangeSubmission::new(exit(7, 8), format!("reporter-{n}")))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("task panicked").unwrap();
    }

    let changes = ledger.get_changes(0, &[], &[]).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes.first().unwrap().times_seen(), 32);
}
