//! Fusion inputs.

use serde::{Deserialize, Serialize};
use vigil_core::entities::DomainFindings;

/// One raw transaction with its own risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub amount: f64,
    pub risk_score: f64,
}

/// Ground truth supplied by a human reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualOutcome {
    Fraud,
    Legitimate,
    Inconclusive,
}

/// How many analysis tools ran out of how many were planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCoverage {
    pub executed: u32,
    pub planned: u32,
}

impl ToolCoverage {
    /// Executed fraction in `[0, 1]`, or `None` when nothing was planned.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        (self.planned > 0)
            .then(|| (f64::from(self.executed) / f64::from(self.planned)).min(1.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionInput {
    #[serde(default)]
    pub findings: DomainFindings,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub manual_outcome: Option<ManualOutcome>,
    #[serde(default)]
    pub tool_coverage: Option<ToolCoverage>,
}

impl FusionInput {
    #[must_use]
    pub fn from_findings(findings: DomainFindings) -> Self {
        Self {
            findings,
            ..Default::default()
        }
    }
}
