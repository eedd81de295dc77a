//! Investigation change set and the mutation envelope passed to `write`.

use serde::Serialize;
use vigil_core::entities::DomainFindings;
use vigil_core::enums::{ActionType, ActorType, InvestigationStatus, LifecycleStage};
use vigil_core::events::Actor;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InvestigationChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvestigationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle_stage: Option<LifecycleStage>,
    /// Merged into live progress by domain key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<DomainFindings>,
    /// Merged into finalized results by domain key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<DomainFindings>,
    /// Copy every live progress domain into results.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub finalize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl InvestigationChanges {
    /// Whether this change set moves status or lifecycle stage.
    #[must_use]
    pub const fn touches_lifecycle(&self) -> bool {
        self.status.is_some() || self.lifecycle_stage.is_some()
    }
}

pub struct InvestigationChangesBuilder(InvestigationChanges);

impl InvestigationChangesBuilder {
    pub fn new() -> Self {
        Self(InvestigationChanges::default())
    }

    pub fn status(mut self, val: InvestigationStatus) -> Self {
        self.0.status = Some(val);
        self
    }

    pub fn lifecycle_stage(mut self, val: LifecycleStage) -> Self {
        self.0.lifecycle_stage = Some(val);
        self
    }

    pub fn progress(mut self, val: DomainFindings) -> Self {
        self.0.progress = Some(val);
        self
    }

    pub fn results(mut self, val: DomainFindings) -> Self {
        self.0.results = Some(val);
        self
    }

    pub fn finalize(mut self) -> Self {
        self.0.finalize = true;
        self
    }

    pub fn note(mut self, val: impl Into<String>) -> Self {
        self.0.note = Some(val.into());
        self
    }

    pub fn build(self) -> InvestigationChanges {
        self.0
    }
}

/// One requested state write: what changed, why, and who asked.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMutation {
    pub action_type: ActionType,
    pub actor: Actor,
    pub changes: InvestigationChanges,
}

impl StateMutation {
    pub fn new(
        action_type: ActionType,
        actor_type: ActorType,
        actor_id: impl Into<String>,
        changes: InvestigationChanges,
    ) -> Self {
        Self {
            action_type,
            actor: Actor {
                actor_type,
                id: actor_id.into(),
            },
            changes,
        }
    }
}
