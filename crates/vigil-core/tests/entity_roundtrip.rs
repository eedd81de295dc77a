//! Serde roundtrip and JsonSchema validation tests for entity and wire types.

use chrono::Utc;
use pretty_assertions::assert_eq;
use schemars::schema_for;
use vigil_core::entities::*;
use vigil_core::enums::*;
use vigil_core::events::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_findings() -> DomainFindings {
    let mut findings = DomainFindings::new();
    findings.insert(
        "network",
        DomainFinding {
            risk_score: Some(0.72),
            confidence: Some(0.8),
            evidence: vec!["tor exit node".into(), "asn mismatch".into()],
            risk_indicators: vec!["anonymizer".into()],
            missing_evidence: vec![],
            llm_analysis: Some("Traffic routed through anonymizers.".into()),
            persisted_at: Some(Utc::now()),
        },
    );
    findings.insert(
        "device",
        DomainFinding {
            risk_score: Some(0.3),
            confidence: Some(0.6),
            missing_evidence: vec!["device".into()],
            ..Default::default()
        },
    );
    findings
}

roundtrip_and_validate!(
    investigation_roundtrip,
    Investigation,
    Investigation {
        id: "inv-a3f8b2c1".into(),
        owner_user_id: "analyst-7".into(),
        status: InvestigationStatus::Running,
        lifecycle_stage: LifecycleStage::InProgress,
        version: 4,
        progress: sample_findings(),
        results: DomainFindings::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    audit_entry_roundtrip,
    AuditLogEntry,
    AuditLogEntry {
        entry_id: 17,
        investigation_id: "inv-a3f8b2c1".into(),
        user_id: "agent-network".into(),
        action_type: ActionType::FindingsPersisted,
        source: ActorType::Agent,
        timestamp_ms: 1_760_000_000_000,
        changes: serde_json::json!({"domain": "network"}),
        state_snapshot: None,
        from_version: 3,
        to_version: 4,
    }
);

roundtrip_and_validate!(
    feed_page_roundtrip,
    FeedPage,
    FeedPage {
        items: vec![FeedEvent {
            id: "evt-17".into(),
            ts: 1_760_000_000_000,
            op: ActionType::StatusChanged,
            investigation_id: "inv-a3f8b2c1".into(),
            actor: Actor {
                actor_type: ActorType::User,
                id: "analyst-7".into(),
            },
            payload: serde_json::json!({"status": "running"}),
            version: 1,
        }],
        next_cursor: Some("MTc2MDAwMDAwMDAwMF8xNw".into()),
        has_more: false,
        poll_after_seconds: 5,
        etag: "\"0123456789abcdef\"".into(),
    }
);

#[test]
fn actor_type_serializes_under_type_key() {
    let actor = Actor {
        actor_type: ActorType::Job,
        id: "resume-worker".into(),
    };
    let json = serde_json::to_value(&actor).unwrap();
    assert_eq!(json, serde_json::json!({"type": "job", "id": "resume-worker"}));
}

#[test]
fn entry_timestamp_converts_from_millis() {
    let entry = AuditLogEntry {
        entry_id: 1,
        investigation_id: "inv-1".into(),
        user_id: "u".into(),
        action_type: ActionType::Annotated,
        source: ActorType::System,
        timestamp_ms: 1_000,
        changes: serde_json::json!({}),
        state_snapshot: None,
        from_version: 0,
        to_version: 1,
    };
    assert_eq!(entry.timestamp().timestamp_millis(), 1_000);
}
