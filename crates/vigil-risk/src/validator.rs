//! Confidence validation across domain findings.
//!
//! Range-checks every score, measures how much the sources disagree about
//! their own confidence, and reports pairs of confident sources whose risk
//! scores point in opposite directions. Disagreement is surfaced as an
//! explicit [`FusionIssue`]; it is never averaged away.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vigil_config::FusionConfig;
use vigil_core::entities::DomainFindings;

/// Sources needed before an identical confidence counts as suspicious.
const UNIFORMITY_MIN_SOURCES: usize = 3;

/// Problems found while validating or fusing findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum FusionIssue {
    ConfidenceOutOfRange { domain: String, value: f64 },
    RiskScoreOutOfRange { domain: String, value: f64 },
    HighVariance { spread: f64, threshold: f64 },
    SuspiciousUniformity { value: f64, domains: Vec<String> },
    Discordance {
        domain_a: String,
        domain_b: String,
        score_a: f64,
        score_b: f64,
        gap: f64,
    },
}

/// A domain that passed range checks and can be fused.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainSignal {
    pub domain: String,
    pub risk_score: f64,
    pub confidence: f64,
    pub evidence_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub usable: Vec<DomainSignal>,
    /// In-range confidence values, including domains without a score.
    pub confidences: Vec<(String, f64)>,
    /// Population standard deviation of `confidences`.
    pub spread: Option<f64>,
    pub issues: Vec<FusionIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn has_discordance(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, FusionIssue::Discordance { .. }))
    }
}

fn in_unit_range(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Population standard deviation; `None` for fewer than two values.
#[must_use]
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

/// Validate every domain finding against `config`.
#[must_use]
pub fn validate(findings: &DomainFindings, config: &FusionConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (domain, finding) in findings.iter() {
        let confidence = match finding.confidence {
            Some(c) if in_unit_range(c) => {
                report.confidences.push((domain.clone(), c));
                Some(c)
            }
            Some(c) => {
                report.issues.push(FusionIssue::ConfidenceOutOfRange {
                    domain: domain.clone(),
                    value: c,
                });
                None
            }
            None => None,
        };

        let risk_score = match finding.risk_score {
            Some(s) if in_unit_range(s) => Some(s),
            Some(s) => {
                report.issues.push(FusionIssue::RiskScoreOutOfRange {
                    domain: domain.clone(),
                    value: s,
                });
                None
            }
            None => None,
        };

        if let (Some(risk_score), Some(confidence)) = (risk_score, confidence) {
            report.usable.push(DomainSignal {
                domain: domain.clone(),
                risk_score,
                confidence,
                evidence_count: finding.evidence.len(),
            });
        } else {
            tracing::debug!(domain = %domain, "domain excluded from fusion");
        }
    }

    let values: Vec<f64> = report.confidences.iter().map(|(_, c)| *c).collect();
    report.spread = population_std_dev(&values);
    if let Some(spread) = report.spread {
        if spread > config.high_variance_threshold {
            report.issues.push(FusionIssue::HighVariance {
                spread,
                threshold: config.high_variance_threshold,
            });
        }
    }

    let mut by_value: BTreeMap<u64, Vec<String>> = BTreeMap::new();
    for (domain, c) in &report.confidences {
        by_value.entry(c.to_bits()).or_default().push(domain.clone());
    }
    for (bits, domains) in by_value {
        if domains.len() >= UNIFORMITY_MIN_SOURCES {
            report.issues.push(FusionIssue::SuspiciousUniformity {
                value: f64::from_bits(bits),
                domains,
            });
        }
    }

    let confident: Vec<&DomainSignal> = report
        .usable
        .iter()
        .filter(|s| s.confidence >= config.discordance_min_confidence)
        .collect();
    let mut discordant = Vec::new();
    for (i, a) in confident.iter().enumerate() {
        for b in &confident[i + 1..] {
            let gap = (a.risk_score - b.risk_score).abs();
            if gap > config.discordance_threshold {
                discordant.push(FusionIssue::Discordance {
                    domain_a: a.domain.clone(),
                    domain_b: b.domain.clone(),
                    score_a: a.risk_score,
                    score_b: b.risk_score,
                    gap,
                });
            }
        }
    }
    report.issues.extend(discordant);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vigil_core::entities::DomainFinding;

    fn finding(score: f64, confidence: f64) -> DomainFinding {
        DomainFinding {
            risk_score: Some(score),
            confidence: Some(confidence),
            ..Default::default()
        }
    }

    fn findings(items: &[(&str, f64, f64)]) -> DomainFindings {
        items
            .iter()
            .map(|(d, s, c)| ((*d).to_string(), finding(*s, *c)))
            .collect()
    }

    #[test]
    fn confident_disagreement_is_reported_not_averaged() {
        let report = validate(
            &findings(&[("A", 0.9, 0.9), ("B", 0.1, 0.9)]),
            &FusionConfig::default(),
        );
        let issue = report
            .issues
            .iter()
            .find(|i| matches!(i, FusionIssue::Discordance { .. }))
            .expect("discordance issue");
        match issue {
            FusionIssue::Discordance { domain_a, domain_b, gap, .. } => {
                assert_eq!(domain_a, "A");
                assert_eq!(domain_b, "B");
                assert!((gap - 0.8).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn low_confidence_sources_do_not_count_toward_discordance() {
        let report = validate(
            &findings(&[("A", 0.9, 0.9), ("B", 0.1, 0.2)]),
            &FusionConfig::default(),
        );
        assert!(!report.has_discordance());
    }

    #[rstest]
    #[case(1.2)]
    #[case(-0.1)]
    #[case(f64::NAN)]
    fn out_of_range_confidence_is_flagged_and_excluded(#[case] confidence: f64) {
        let report = validate(&findings(&[("net", 0.5, confidence)]), &FusionConfig::default());
        assert!(report.usable.is_empty());
        assert!(matches!(
            report.issues.as_slice(),
            [FusionIssue::ConfidenceOutOfRange { .. }]
        ));
    }

    #[test]
    fn out_of_range_score_is_flagged() {
        let report = validate(&findings(&[("net", 3.0, 0.5)]), &FusionConfig::default());
        assert!(report.usable.is_empty());
        assert_eq!(report.confidences.len(), 1);
        assert!(matches!(
            report.issues.as_slice(),
            [FusionIssue::RiskScoreOutOfRange { .. }]
        ));
    }

    #[test]
    fn identical_confidence_from_three_sources_is_suspicious() {
        let report = validate(
            &findings(&[("a", 0.4, 0.7), ("b", 0.5, 0.7), ("c", 0.45, 0.7)]),
            &FusionConfig::default(),
        );
        assert!(report.issues.iter().any(|i| matches!(
            i,
            FusionIssue::SuspiciousUniformity { domains, .. } if domains.len() == 3
        )));
    }

    #[test]
    fn wide_confidence_spread_is_high_variance() {
        let report = validate(
            &findings(&[("a", 0.5, 0.05), ("b", 0.5, 0.95)]),
            &FusionConfig::default(),
        );
        assert!((report.spread.unwrap() - 0.45).abs() < 1e-9);
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, FusionIssue::HighVariance { .. })));
    }

    #[test]
    fn std_dev_needs_two_values() {
        assert_eq!(population_std_dev(&[0.5]), None);
        assert_eq!(population_std_dev(&[0.5, 0.5]), Some(0.0));
    }
}
