//! Versioned write path: compare-and-swap, atomic ledger append, rollback,
//! concurrent writers, and the telemetry journal.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use vigil_core::enums::{ActionType, ActorType, InvestigationStatus};
use vigil_core::errors::ErrorKind;
use vigil_db::error::DatabaseError;
use vigil_db::service::InvestigationService;
use vigil_db::updates::investigation::{InvestigationChangesBuilder, StateMutation};
use vigil_lock::FileLocker;

async fn test_service(dir: &TempDir) -> InvestigationService {
    let db_path = dir.path().join("vigil.db");
    InvestigationService::new_local(db_path.to_str().unwrap(), None, FileLocker::default())
        .await
        .unwrap()
}

fn note(actor: &str, text: &str) -> StateMutation {
    StateMutation::new(
        ActionType::Annotated,
        ActorType::Agent,
        actor,
        InvestigationChangesBuilder::new().note(text).build(),
    )
}

// ---------------------------------------------------------------------------
// Compare-and-swap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_version_conflicts_and_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let svc = test_service(&dir).await;
    let inv = svc.create_investigation("analyst-1", Some("X")).await.unwrap();

    for v in 0..4 {
        svc.write("X", &note("agent-a", &format!("step {v}")), v)
            .await
            .unwrap();
    }
    let before = svc.get_investigation(&inv.id).await.unwrap();
    assert_eq!(before.version, 4);

    let err = svc.write("X", &note("agent-b", "late"), 3).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RetryWithFreshVersion);
    assert!(matches!(
        err,
        DatabaseError::VersionConflict {
            expected: 3,
            actual: 4,
            ..
        }
    ));

    let after = svc.get_investigation("X").await.unwrap();
    assert_eq!(after, before);
    assert_eq!(svc.count_entries("X").await.unwrap(), 4);
}

#[tokio::test]
async fn failed_ledger_insert_rolls_back_state() {
    let dir = tempfile::tempdir().unwrap();
    let svc = test_service(&dir).await;
    svc.create_investigation("analyst-1", Some("inv-rb")).await.unwrap();

    // Occupy version 1 in the ledger so the next write's entry collides.
    svc.db()
        .conn()
        .execute(
            "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
                 changes_json, from_version, to_version)
             VALUES ('inv-rb', 'intruder', 'annotated', 'system', 1, '{}', 0, 1)",
            (),
        )
        .await
        .unwrap();

    let mutation = StateMutation::new(
        ActionType::StatusChanged,
        ActorType::User,
        "analyst-1",
        InvestigationChangesBuilder::new()
            .status(InvestigationStatus::Initializing)
            .build(),
    );
    let err = svc.write("inv-rb", &mutation, 0).await.unwrap_err();
    assert!(!matches!(err, DatabaseError::VersionConflict { .. }));

    let stored = svc.get_investigation("inv-rb").await.unwrap();
    assert_eq!(stored.version, 0);
    assert_eq!(stored.status, InvestigationStatus::Pending);
    assert_eq!(svc.count_entries("inv-rb").await.unwrap(), 1);
}

#[tokio::test]
async fn ledger_timestamps_never_decrease() {
    let dir = tempfile::tempdir().unwrap();
    let svc = test_service(&dir).await;
    svc.create_investigation("analyst-1", Some("inv-ts")).await.unwrap();

    // An entry from a clock far ahead of ours.
    let future_ms = chrono::Utc::now().timestamp_millis() + 3_600_000;
    svc.db()
        .conn()
        .execute(
            "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
                 changes_json, from_version, to_version)
             VALUES ('inv-ts', 'skewed', 'annotated', 'system', ?1, '{}', 100, 101)",
            [future_ms],
        )
        .await
        .unwrap();

    let outcome = svc.write("inv-ts", &note("agent-a", "now"), 0).await.unwrap();
    assert_eq!(outcome.entry.timestamp_ms, future_ms);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_build_one_unbroken_chain() {
    const WRITERS: u64 = 8;

    let dir = tempfile::tempdir().unwrap();
    let svc = Arc::new(test_service(&dir).await);
    svc.create_investigation("analyst-1", Some("inv-race")).await.unwrap();

    let mut handles = Vec::new();
    for w in 0..WRITERS {
        let svc = Arc::clone(&svc);
        handles.push(tokio::spawn(async move {
            let mutation = note(&format!("agent-{w}"), "done");
            let mut conflicts = 0_u32;
            loop {
                let current = svc.get_investigation("inv-race").await.unwrap();
                match svc.write("inv-race", &mutation, current.version).await {
                    Ok(outcome) => return (outcome.new_version, conflicts),
                    Err(DatabaseError::VersionConflict { .. }) => conflicts += 1,
                    Err(e) => panic!("writer {w} failed: {e}"),
                }
            }
        }));
    }

    let mut versions = Vec::new();
    for handle in handles {
        let (version, _) = handle.await.unwrap();
        versions.push(version);
    }
    versions.sort_unstable();
    assert_eq!(versions, (1..=WRITERS).collect::<Vec<_>>());

    assert_eq!(svc.get_investigation("inv-race").await.unwrap().version, WRITERS);
    assert_eq!(svc.count_entries("inv-race").await.unwrap(), WRITERS);
    assert_eq!(svc.verify_chain("inv-race").await.unwrap(), WRITERS as usize);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_lifecycle_to_completed() {
    let dir = tempfile::tempdir().unwrap();
    let svc = test_service(&dir).await;
    let inv = svc.create_investigation("analyst-1", None).await.unwrap();

    let mut version = 0;
    for status in [
        InvestigationStatus::Initializing,
        InvestigationStatus::Running,
        InvestigationStatus::Paused,
        InvestigationStatus::Running,
        InvestigationStatus::Completed,
    ] {
        let mutation = StateMutation::new(
            ActionType::StatusChanged,
            ActorType::Job,
            "resume-worker",
            InvestigationChangesBuilder::new().status(status).build(),
        );
        version = svc.write(&inv.id, &mutation, version).await.unwrap().new_version;
    }

    let terminal = StateMutation::new(
        ActionType::StatusChanged,
        ActorType::User,
        "analyst-1",
        InvestigationChangesBuilder::new()
            .status(InvestigationStatus::Running)
            .build(),
    );
    let err = svc.write(&inv.id, &terminal, version).await.unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidTransition { .. }));

    let entries = svc.entries_for(&inv.id).await.unwrap();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.state_snapshot.is_some()));
    assert_eq!(entries[4].source, ActorType::Job);
}

#[tokio::test]
async fn verify_chain_reports_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let svc = test_service(&dir).await;
    svc.create_investigation("analyst-1", Some("inv-gap")).await.unwrap();
    svc.write("inv-gap", &note("a", "one"), 0).await.unwrap();

    svc.db()
        .conn()
        .execute(
            "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
                 changes_json, from_version, to_version)
             VALUES ('inv-gap', 'x', 'annotated', 'system', 9999999999999, '{}', 5, 6)",
            (),
        )
        .await
        .unwrap();

    match svc.verify_chain("inv-gap").await {
        Err(DatabaseError::ChainBroken { at_version, .. }) => assert_eq!(at_version, 1),
        other => panic!("expected broken chain, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Telemetry journal
// ---------------------------------------------------------------------------

#[tokio::test]
async fn committed_writes_are_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vigil.db");
    let svc = InvestigationService::new_local(
        db_path.to_str().unwrap(),
        Some(dir.path().join("journal")),
        FileLocker::default(),
    )
    .await
    .unwrap();
    assert!(svc.journal().is_enabled());

    let inv = svc.create_investigation("analyst-1", None).await.unwrap();
    svc.write(&inv.id, &note("a", "one"), 0).await.unwrap();
    svc.write(&inv.id, &note("a", "two"), 1).await.unwrap();
    let _ = svc.write(&inv.id, &note("a", "stale"), 1).await.unwrap_err();

    let records = svc.journal().records(&inv.id).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].to_version, 1);
    assert_eq!(records[1].to_version, 2);
}

#[tokio::test]
async fn journal_failure_does_not_fail_the_write() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("vigil.db");
    let journal_dir = dir.path().join("journal");
    let svc = InvestigationService::new_local(
        db_path.to_str().unwrap(),
        Some(journal_dir.clone()),
        FileLocker::default(),
    )
    .await
    .unwrap();
    let inv = svc.create_investigation("analyst-1", None).await.unwrap();

    // A directory where the journal file should be makes the append fail.
    std::fs::create_dir_all(journal_dir.join(format!("{}.jsonl", inv.id))).unwrap();

    let outcome = svc.write(&inv.id, &note("a", "one"), 0).await.unwrap();
    assert_eq!(outcome.new_version, 1);
    assert_eq!(svc.count_entries(&inv.id).await.unwrap(), 1);
}
