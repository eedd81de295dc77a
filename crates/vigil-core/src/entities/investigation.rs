use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::DomainFindings;
use crate::enums::{InvestigationStatus, LifecycleStage};

/// The mutable projection of one investigation.
///
/// Only ever changed through a version compare-and-swap; `version` grows by
/// exactly one per accepted write.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Investigation {
    pub id: String,
    pub owner_user_id: String,
    pub status: InvestigationStatus,
    pub lifecycle_stage: LifecycleStage,
    pub version: u64,
    /// Live per-domain findings, written while analysis runs.
    pub progress: DomainFindings,
    /// Finalized per-domain findings.
    pub results: DomainFindings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
