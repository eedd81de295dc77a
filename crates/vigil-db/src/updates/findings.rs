//! Domain finding update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::entities::DomainFinding;

/// Partial finding from one analysis domain. `Some` fields overwrite the
/// stored value for that domain; `None` fields keep it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FindingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_indicators: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_evidence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<String>,
}

impl FindingsUpdate {
    /// Merge onto `existing` and stamp `persisted_at`.
    #[must_use]
    pub fn apply(&self, existing: Option<&DomainFinding>, now: DateTime<Utc>) -> DomainFinding {
        let mut finding = existing.cloned().unwrap_or_default();
        if let Some(v) = self.risk_score {
            finding.risk_score = Some(v);
        }
        if let Some(v) = self.confidence {
            finding.confidence = Some(v);
        }
        if let Some(ref v) = self.evidence {
            finding.evidence.clone_from(v);
        }
        if let Some(ref v) = self.risk_indicators {
            finding.risk_indicators.clone_from(v);
        }
        if let Some(ref v) = self.missing_evidence {
            finding.missing_evidence.clone_from(v);
        }
        if let Some(ref v) = self.llm_analysis {
            finding.llm_analysis = Some(v.clone());
        }
        finding.persisted_at = Some(now);
        finding
    }
}

impl From<DomainFinding> for FindingsUpdate {
    fn from(finding: DomainFinding) -> Self {
        Self {
            risk_score: finding.risk_score,
            confidence: finding.confidence,
            evidence: Some(finding.evidence),
            risk_indicators: Some(finding.risk_indicators),
            missing_evidence: Some(finding.missing_evidence),
            llm_analysis: finding.llm_analysis,
        }
    }
}

pub struct FindingsUpdateBuilder(FindingsUpdate);

impl FindingsUpdateBuilder {
    pub fn new() -> Self {
        Self(FindingsUpdate::default())
    }

    pub fn risk_score(mut self, val: f64) -> Self {
        self.0.risk_score = Some(val);
        self
    }

    pub fn confidence(mut self, val: f64) -> Self {
        self.0.confidence = Some(val);
        self
    }

    pub fn evidence(mut self, val: Vec<String>) -> Self {
        self.0.evidence = Some(val);
        self
    }

    pub fn risk_indicators(mut self, val: Vec<String>) -> Self {
        self.0.risk_indicators = Some(val);
        self
    }

    pub fn missing_evidence(mut self, val: Vec<String>) -> Self {
        self.0.missing_evidence = Some(val);
        self
    }

    pub fn llm_analysis(mut self, val: impl Into<String>) -> Self {
        self.0.llm_analysis = Some(val.into());
        self
    }

    pub fn build(self) -> FindingsUpdate {
        self.0
    }
}
