use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output of one analysis domain (network, device, location, ...).
///
/// Every field is optional on the wire so partially reporting agents still
/// deserialize; the fusion engine decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DomainFinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default)]
    pub risk_indicators: Vec<String>,
    /// Evidence categories the agent explicitly reports as unavailable
    /// (e.g. `"identity"`, `"device"`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_evidence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted_at: Option<DateTime<Utc>>,
}

/// Map from domain name to that domain's finding. Merge is by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct DomainFindings(pub BTreeMap<String, DomainFinding>);

impl DomainFindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, domain: &str) -> Option<&DomainFinding> {
        self.0.get(domain)
    }

    pub fn insert(&mut self, domain: impl Into<String>, finding: DomainFinding) {
        self.0.insert(domain.into(), finding);
    }

    /// Overlay `other` onto `self`, replacing any domain present in both.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DomainFinding)> {
        self.0.iter()
    }

    /// Evidence items across all domains.
    #[must_use]
    pub fn total_evidence(&self) -> usize {
        self.0.values().map(|f| f.evidence.len()).sum()
    }
}

impl FromIterator<(String, DomainFinding)> for DomainFindings {
    fn from_iter<I: IntoIterator<Item = (String, DomainFinding)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
