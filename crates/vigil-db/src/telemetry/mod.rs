//! Best-effort telemetry journal.
//!
//! After a state write commits, the ledger entry is mirrored into a
//! per-investigation JSONL file for offline analysis. The journal is a
//! secondary copy: the database is authoritative, and a failed append is
//! logged and dropped without touching the committed write.

pub mod journal;

pub use journal::TelemetryJournal;

use serde::{Deserialize, Serialize};
use vigil_core::entities::AuditLogEntry;
use vigil_core::enums::{ActionType, ActorType};

/// One line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalRecord {
    /// Record format version.
    pub v: u8,
    pub ts: i64,
    pub investigation_id: String,
    pub entry_id: i64,
    pub op: ActionType,
    pub source: ActorType,
    pub user_id: String,
    pub from_version: u64,
    pub to_version: u64,
    pub changes: serde_json::Value,
}

impl From<&AuditLogEntry> for JournalRecord {
    fn from(entry: &AuditLogEntry) -> Self {
        Self {
            v: 1,
            ts: entry.timestamp_ms,
            investigation_id: entry.investigation_id.clone(),
            entry_id: entry.entry_id,
            op: entry.action_type,
            source: entry.source,
            user_id: entry.user_id.clone(),
            from_version: entry.from_version,
            to_version: entry.to_version,
            changes: entry.changes.clone(),
        }
    }
}
