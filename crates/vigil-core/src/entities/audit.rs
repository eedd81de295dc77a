use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ActionType, ActorType};

/// One immutable ledger entry. Written in the same transaction as the state
/// change it describes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AuditLogEntry {
    /// Monotonic, unique across the whole ledger.
    pub entry_id: i64,
    pub investigation_id: String,
    pub user_id: String,
    pub action_type: ActionType,
    pub source: ActorType,
    /// Unix milliseconds. Never decreases within one investigation.
    pub timestamp_ms: i64,
    pub changes: serde_json::Value,
    pub state_snapshot: Option<serde_json::Value>,
    pub from_version: u64,
    pub to_version: u64,
}

impl AuditLogEntry {
    /// The entry timestamp as a `DateTime`.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_ms)
            .single()
            .unwrap_or_default()
    }
}
