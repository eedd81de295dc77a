//! # vigil-risk
//!
//! Confidence-weighted fusion of per-domain risk signals.
//!
//! The engine validates each domain's confidence and score, reports
//! disagreement between sources as explicit issues, blends domain and
//! transaction risk into one score, and computes a separate confidence for
//! that score. Pure computation: no I/O, no clock.
//!
//! ```
//! use vigil_core::entities::{DomainFinding, DomainFindings};
//! use vigil_risk::{FusionInput, RiskEngine};
//!
//! let mut findings = DomainFindings::new();
//! findings.insert("network", DomainFinding {
//!     risk_score: Some(0.7),
//!     confidence: Some(0.9),
//!     ..Default::default()
//! });
//! let assessment = RiskEngine::default()
//!     .assess(&FusionInput::from_findings(findings))
//!     .unwrap();
//! assert!((assessment.risk_score - 0.7).abs() < 1e-9);
//! ```

pub mod calculator;
pub mod confidence;
mod error;
mod input;
pub mod validator;

pub use error::RiskError;
pub use input::{FusionInput, ManualOutcome, ToolCoverage, TransactionRecord};
pub use validator::{FusionIssue, ValidationReport};

use serde::{Deserialize, Serialize};
use vigil_config::FusionConfig;

use crate::confidence::ConfidenceFactors;

/// Result of fusing one investigation's signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub confidence: f64,
    pub domain_score: Option<f64>,
    pub transaction_score: Option<f64>,
    pub penalty_applied: bool,
    pub manual_override: bool,
    pub issues: Vec<FusionIssue>,
}

#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: FusionConfig,
}

impl RiskEngine {
    #[must_use]
    pub const fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Validate findings without scoring them.
    #[must_use]
    pub fn validate(&self, input: &FusionInput) -> ValidationReport {
        validator::validate(&input.findings, &self.config)
    }

    /// Fuse all inputs into one assessment.
    ///
    /// A reviewer-confirmed fraud outcome fixes the score at
    /// [`calculator::MANUAL_FRAUD_SCORE`] with full confidence, whatever the
    /// findings say; validation issues are still reported.
    ///
    /// # Errors
    ///
    /// - `RiskError::InsufficientRiskData` with no usable domain score and
    ///   no usable transaction data
    /// - `RiskError::ConfidenceDataInsufficient` if no confidence factor
    ///   can be computed
    pub fn assess(&self, input: &FusionInput) -> Result<RiskAssessment, RiskError> {
        let report = self.validate(input);

        if input.manual_outcome == Some(ManualOutcome::Fraud) {
            tracing::debug!("manual fraud outcome overrides fused score");
            return Ok(RiskAssessment {
                risk_score: calculator::MANUAL_FRAUD_SCORE,
                confidence: 1.0,
                domain_score: calculator::weighted_domain_score(&report.usable),
                transaction_score: calculator::transaction_score(&input.transactions),
                penalty_applied: false,
                manual_override: true,
                issues: report.issues,
            });
        }

        let breakdown =
            calculator::calculate_risk(&report.usable, &input.findings, &input.transactions)?;
        let confidence = confidence::combine(&self.confidence_factors(input, &report))?;

        if report.has_discordance() {
            tracing::warn!(
                risk_score = breakdown.score,
                "domain sources disagree; see discordance issues"
            );
        }

        Ok(RiskAssessment {
            risk_score: breakdown.score,
            confidence,
            domain_score: breakdown.domain_score,
            transaction_score: breakdown.transaction_score,
            penalty_applied: breakdown.penalty_applied,
            manual_override: false,
            issues: report.issues,
        })
    }

    fn confidence_factors(&self, input: &FusionInput, report: &ValidationReport) -> ConfidenceFactors {
        #[allow(clippy::cast_precision_loss)]
        let domain_confidence = (!report.confidences.is_empty()).then(|| {
            report.confidences.iter().map(|(_, c)| c).sum::<f64>()
                / report.confidences.len() as f64
        });

        let expected = &self.config.expected_domains;
        #[allow(clippy::cast_precision_loss)]
        let completeness = (!expected.is_empty()).then(|| {
            let present = expected
                .iter()
                .filter(|d| input.findings.get(d).is_some())
                .count();
            present as f64 / expected.len() as f64
        });

        let evidence_volume = (!input.findings.is_empty())
            .then(|| confidence::evidence_volume(input.findings.total_evidence()));

        ConfidenceFactors {
            domain_confidence,
            completeness,
            tool_coverage: input.tool_coverage.as_ref().and_then(ToolCoverage::ratio),
            evidence_volume,
        }
    }
}
