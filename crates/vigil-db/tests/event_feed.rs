//! Event feed pagination, cursors, ETags, and authorization.

use std::sync::Arc;

use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use schemars::schema_for;
use tempfile::TempDir;

use vigil_config::EventFeedConfig;
use vigil_core::enums::{ActionType, ActorType};
use vigil_core::events::FeedEvent;
use vigil_db::feed::{Cursor, EventFeedService, FeedError, FeedRequest, compute_etag};
use vigil_db::service::InvestigationService;
use vigil_db::updates::investigation::{InvestigationChangesBuilder, StateMutation};
use vigil_lock::FileLocker;

const OWNER: &str = "analyst-1";

/// A feed over an investigation with `entries` ledger entries.
async fn feed_with_entries(
    dir: &TempDir,
    entries: u64,
    config: EventFeedConfig,
) -> (Arc<InvestigationService>, EventFeedService) {
    let db_path = dir.path().join("vigil.db");
    let svc = InvestigationService::new_local(db_path.to_str().unwrap(), None, FileLocker::default())
        .await
        .unwrap();
    svc.create_investigation(OWNER, Some("X")).await.unwrap();
    for v in 0..entries {
        let mutation = StateMutation::new(
            ActionType::Annotated,
            ActorType::Agent,
            "agent-net",
            InvestigationChangesBuilder::new()
                .note(format!("step {v}"))
                .build(),
        );
        svc.write("X", &mutation, v).await.unwrap();
    }
    let svc = Arc::new(svc);
    let feed = EventFeedService::new(Arc::clone(&svc), config);
    (svc, feed)
}

#[tokio::test]
async fn pages_through_five_entries() {
    let dir = tempfile::tempdir().unwrap();
    let (_svc, feed) = feed_with_entries(&dir, 5, EventFeedConfig::default()).await;

    let first = feed.fetch(&FeedRequest::new("X", OWNER).limit(2)).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert!(first.has_more);
    assert_eq!(first.poll_after_seconds, 0);
    let cursor = first.next_cursor.clone().expect("cursor after first page");

    let second = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor(cursor).limit(3))
        .await
        .unwrap();
    assert_eq!(second.items.len(), 3);
    assert!(!second.has_more);

    let versions: Vec<u64> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|e| e.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    assert!(second.poll_after_seconds > 0);
}

#[tokio::test]
async fn polling_while_writers_append_sees_every_version_once() {
    const TOTAL: u64 = 9;
    let dir = tempfile::tempdir().unwrap();
    let (svc, feed) = feed_with_entries(&dir, 0, EventFeedConfig::default()).await;

    // A writer whose clock runs a minute ahead commits version 1. Every later
    // write clamps to that timestamp, so all entries share one millisecond
    // and each page boundary falls between equal timestamps.
    let skewed = Utc::now().timestamp_millis() + 60_000;
    let conn = svc.db().conn();
    conn.execute(
        "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
             changes_json, from_version, to_version)
         VALUES ('X', 'agent-skewed', 'annotated', 'agent', ?1, '{}', 0, 1)",
        [skewed],
    )
    .await
    .unwrap();
    conn.execute("UPDATE investigations SET version = 1 WHERE id = 'X'", ())
        .await
        .unwrap();

    let annotate = |step: u64| {
        StateMutation::new(
            ActionType::Annotated,
            ActorType::Agent,
            "agent-net",
            InvestigationChangesBuilder::new()
                .note(format!("step {step}"))
                .build(),
        )
    };
    for version in 1..3 {
        svc.write("X", &annotate(version), version).await.unwrap();
    }

    let mut next_version = 3;
    let mut cursor: Option<String> = None;
    let mut seen: Vec<FeedEvent> = Vec::new();
    loop {
        let mut request = FeedRequest::new("X", OWNER).limit(2);
        if let Some(token) = cursor.take() {
            request = request.cursor(token);
        }
        let page = feed.fetch(&request).await.unwrap();
        let drained = page.items.is_empty();
        seen.extend(page.items);
        cursor = page.next_cursor;

        if next_version < TOTAL {
            svc.write("X", &annotate(next_version), next_version)
                .await
                .unwrap();
            next_version += 1;
        } else if drained {
            break;
        }
    }

    let versions: Vec<u64> = seen.iter().map(|e| e.version).collect();
    assert_eq!(versions, (1..=TOTAL).collect::<Vec<_>>());
    assert!(seen.iter().all(|e| e.ts == skewed));
    assert_eq!(svc.verify_chain("X").await.unwrap(), 9);
}

#[tokio::test]
async fn events_carry_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let (_svc, feed) = feed_with_entries(&dir, 1, EventFeedConfig::default()).await;
    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();

    let event = &page.items[0];
    assert!(event.id.starts_with("evt-"));
    assert_eq!(event.op, ActionType::Annotated);
    assert_eq!(event.actor.actor_type, ActorType::Agent);
    assert_eq!(event.actor.id, "agent-net");
    assert_eq!(event.payload, serde_json::json!({"note": "step 0"}));

    let schema = serde_json::to_value(schema_for!(FeedEvent)).unwrap();
    let validator = jsonschema::validator_for(&schema).unwrap();
    assert!(validator.is_valid(&serde_json::to_value(event).unwrap()));
}

#[tokio::test]
async fn empty_page_echoes_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let (_svc, feed) = feed_with_entries(&dir, 2, EventFeedConfig::default()).await;

    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();
    let cursor = page.next_cursor.unwrap();

    let again = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor(cursor.clone()))
        .await
        .unwrap();
    assert!(again.items.is_empty());
    assert!(!again.has_more);
    assert_eq!(again.next_cursor, Some(cursor));
}

#[tokio::test]
async fn expired_and_malformed_cursors_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let (_svc, feed) = feed_with_entries(&dir, 1, EventFeedConfig::default()).await;

    let old = Cursor::new((Utc::now() - Duration::days(31)).timestamp_millis(), 1).encode();
    let err = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor(old))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::ExpiredCursor { .. }));
    assert_eq!(err.code(), "expired_cursor");

    let err = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor("not a cursor"))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::InvalidCursor(_)));
    assert_eq!(err.code(), "invalid_cursor");
}

#[tokio::test]
async fn malformed_row_is_skipped_but_cursor_advances() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, feed) = feed_with_entries(&dir, 2, EventFeedConfig::default()).await;

    let later = Utc::now().timestamp_millis() + 1_000;
    svc.db()
        .conn()
        .execute(
            "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
                 changes_json, from_version, to_version)
             VALUES ('X', 'ghost', 'teleported', 'agent', ?1, '{}', 98, 99)",
            [later],
        )
        .await
        .unwrap();

    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();
    assert_eq!(page.items.len(), 2);

    let cursor = Cursor::decode(page.next_cursor.as_deref().unwrap()).unwrap();
    assert_eq!(cursor.timestamp_ms, later);

    let next = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor(page.next_cursor.unwrap()))
        .await
        .unwrap();
    assert!(next.items.is_empty());
}

#[tokio::test]
async fn etag_tracks_version() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, feed) = feed_with_entries(&dir, 3, EventFeedConfig::default()).await;

    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();
    assert_eq!(page.etag, compute_etag("X", 3));
    assert!(feed.is_not_modified("X", &page.etag).await.unwrap());

    let mutation = StateMutation::new(
        ActionType::Annotated,
        ActorType::User,
        OWNER,
        InvestigationChangesBuilder::new().note("more").build(),
    );
    svc.write("X", &mutation, 3).await.unwrap();
    assert!(!feed.is_not_modified("X", &page.etag).await.unwrap());
    assert!(!feed.is_not_modified("missing", &page.etag).await.unwrap());
}

#[tokio::test]
async fn only_owner_and_admins_can_read() {
    let dir = tempfile::tempdir().unwrap();
    let config = EventFeedConfig {
        admin_users: vec!["root".into()],
        ..Default::default()
    };
    let (_svc, feed) = feed_with_entries(&dir, 1, config).await;

    let err = feed.fetch(&FeedRequest::new("X", "stranger")).await.unwrap_err();
    assert!(matches!(err, FeedError::Unauthorized { .. }));

    assert_eq!(feed.fetch(&FeedRequest::new("X", "root")).await.unwrap().items.len(), 1);

    let err = feed.fetch(&FeedRequest::new("nope", OWNER)).await.unwrap_err();
    assert!(matches!(err, FeedError::NotFound(_)));
}

#[tokio::test]
async fn limit_above_max_is_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let config = EventFeedConfig {
        default_limit: 2,
        max_limit: 3,
        ..Default::default()
    };
    let (_svc, feed) = feed_with_entries(&dir, 5, config).await;

    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();
    assert_eq!(page.items.len(), 2);

    let page = feed.fetch(&FeedRequest::new("X", OWNER).limit(50)).await.unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(page.has_more);
}

#[tokio::test]
async fn cursor_on_a_quiet_investigation_expires_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let (svc, feed) = feed_with_entries(&dir, 0, EventFeedConfig::default()).await;

    let stale = (Utc::now() - Duration::days(31)).timestamp_millis();
    svc.db()
        .conn()
        .execute(
            "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
                 changes_json, from_version, to_version)
             VALUES ('X', 'agent-net', 'annotated', 'agent', ?1, '{}', 0, 1)",
            [stale],
        )
        .await
        .unwrap();

    let page = feed.fetch(&FeedRequest::new("X", OWNER)).await.unwrap();
    assert_eq!(page.items.len(), 1);
    let cursor = page.next_cursor.expect("cursor after the only entry");

    let err = feed
        .fetch(&FeedRequest::new("X", OWNER).cursor(cursor))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::ExpiredCursor { age_days: 31, .. }));
}
