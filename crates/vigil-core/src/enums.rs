//! Status enums, lifecycle stages, ledger actions, and actor sources.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `InvestigationStatus` provides `allowed_next_states()` so transitions are
//! enforced at the application layer, not by the database.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// InvestigationStatus
// ---------------------------------------------------------------------------

/// Execution status of an investigation.
///
/// ```text
/// pending → initializing → running ⇄ paused
///                          running → completed | failed | cancelled
/// pending | initializing | paused → failed | cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationStatus {
    Pending,
    Initializing,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl InvestigationStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Initializing, Self::Failed, Self::Cancelled],
            Self::Initializing => &[Self::Running, Self::Failed, Self::Cancelled],
            Self::Running => &[Self::Paused, Self::Completed, Self::Failed, Self::Cancelled],
            Self::Paused => &[Self::Running, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    ///
    /// Re-asserting the current status is always accepted.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next_states().contains(&next)
    }

    /// Terminal states admit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvestigationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LifecycleStage
// ---------------------------------------------------------------------------

/// Coarse lifecycle of the investigation record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    Draft,
    Submitted,
    InProgress,
    Completed,
    Failed,
}

impl LifecycleStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Kind of mutation recorded in the audit ledger.
///
/// Doubles as the `op` field of feed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    StatusChanged,
    LifecycleChanged,
    ProgressUpdated,
    FindingsPersisted,
    ResultsFinalized,
    Annotated,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusChanged => "status_changed",
            Self::LifecycleChanged => "lifecycle_changed",
            Self::ProgressUpdated => "progress_updated",
            Self::FindingsPersisted => "findings_persisted",
            Self::ResultsFinalized => "results_finalized",
            Self::Annotated => "annotated",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActorType
// ---------------------------------------------------------------------------

/// Who (or what) produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// Human operator.
    User,
    /// Independent analysis agent.
    Agent,
    /// The store itself (e.g. finalization).
    System,
    /// Resumed background job.
    Job,
}

impl ActorType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::System => "system",
            Self::Job => "job",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
