//! Overall confidence in a risk assessment.
//!
//! Up to four factors, in priority order: average domain confidence, data
//! completeness, tool coverage, and evidence volume. The first available
//! factor carries half the weight and the rest share the other half.

use crate::error::RiskError;

/// Evidence items at which the volume factor saturates.
const EVIDENCE_SATURATION: f64 = 20.0;

/// Inputs to the confidence combination. `None` marks an unavailable factor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfidenceFactors {
    pub domain_confidence: Option<f64>,
    pub completeness: Option<f64>,
    pub tool_coverage: Option<f64>,
    pub evidence_volume: Option<f64>,
}

impl ConfidenceFactors {
    fn available(&self) -> Vec<f64> {
        [
            self.domain_confidence,
            self.completeness,
            self.tool_coverage,
            self.evidence_volume,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Evidence volume factor in `[0, 1]`.
#[must_use]
pub fn evidence_volume(total_evidence: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let total = total_evidence as f64;
    (total / EVIDENCE_SATURATION).min(1.0)
}

/// Combine available factors into one confidence value in `[0, 1]`.
///
/// # Errors
///
/// Returns `RiskError::ConfidenceDataInsufficient` when no factor is available.
pub fn combine(factors: &ConfidenceFactors) -> Result<f64, RiskError> {
    let available = factors.available();
    let Some((first, rest)) = available.split_first() else {
        return Err(RiskError::ConfidenceDataInsufficient);
    };
    if rest.is_empty() {
        return Ok(first.clamp(0.0, 1.0));
    }

    #[allow(clippy::cast_precision_loss)]
    let rest_weight = 0.5 / rest.len() as f64;
    let combined = 0.5 * first + rest.iter().map(|f| f * rest_weight).sum::<f64>();
    Ok(combined.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn no_factors_is_a_hard_failure() {
        assert_eq!(
            combine(&ConfidenceFactors::default()),
            Err(RiskError::ConfidenceDataInsufficient)
        );
    }

    #[rstest]
    #[case(ConfidenceFactors { domain_confidence: Some(0.8), ..Default::default() }, 0.8)]
    #[case(
        ConfidenceFactors { domain_confidence: Some(0.8), completeness: Some(0.4), ..Default::default() },
        0.6
    )]
    #[case(
        ConfidenceFactors {
            domain_confidence: Some(1.0),
            completeness: Some(0.0),
            tool_coverage: Some(0.5),
            evidence_volume: Some(1.0),
        },
        0.75
    )]
    #[case(ConfidenceFactors { tool_coverage: Some(0.3), evidence_volume: Some(0.1), ..Default::default() }, 0.2)]
    fn first_factor_takes_half(#[case] factors: ConfidenceFactors, #[case] expected: f64) {
        assert!((combine(&factors).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn evidence_volume_saturates() {
        assert!((evidence_volume(10) - 0.5).abs() < 1e-9);
        assert!((evidence_volume(200) - 1.0).abs() < f64::EPSILON);
    }
}
