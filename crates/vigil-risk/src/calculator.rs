//! Risk score calculation.
//!
//! Domain scores are blended by weight `confidence * (1 + min(evidence / 10, 1))`,
//! so a confident domain backed by ten or more evidence items counts twice as
//! much as an equally confident domain with none. Transaction data, when
//! present, is blended in at a fixed ratio.

use vigil_core::entities::DomainFindings;

use crate::error::RiskError;
use crate::input::TransactionRecord;
use crate::validator::DomainSignal;

/// Share of the final score taken by domain findings when transaction data
/// is also present.
pub const DOMAIN_BLEND: f64 = 0.7;
pub const TRANSACTION_BLEND: f64 = 0.3;

/// Added when identity or device evidence is explicitly reported missing.
pub const MISSING_EVIDENCE_PENALTY: f64 = 0.10;

/// Score when a reviewer confirmed fraud.
pub const MANUAL_FRAUD_SCORE: f64 = 0.95;

/// Evidence categories whose absence raises the score.
const PENALIZED_MISSING: [&str; 2] = ["identity", "device"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskBreakdown {
    pub score: f64,
    pub domain_score: Option<f64>,
    pub transaction_score: Option<f64>,
    pub penalty_applied: bool,
}

/// Fusion weight of one domain.
#[must_use]
pub fn domain_weight(confidence: f64, evidence_count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let evidence_boost = (evidence_count as f64 / 10.0).min(1.0);
    confidence * (1.0 + evidence_boost)
}

/// Weighted mean of usable domain scores.
///
/// If every weight is zero the plain mean is used, so zero-confidence
/// domains still produce a score rather than nothing.
#[must_use]
pub fn weighted_domain_score(signals: &[DomainSignal]) -> Option<f64> {
    if signals.is_empty() {
        return None;
    }
    let (weighted, total) = signals.iter().fold((0.0, 0.0), |(ws, tw), s| {
        let w = domain_weight(s.confidence, s.evidence_count);
        (ws + w * s.risk_score, tw + w)
    });
    if total > 0.0 {
        Some(weighted / total)
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = signals.len() as f64;
        Some(signals.iter().map(|s| s.risk_score).sum::<f64>() / n)
    }
}

/// Amount-weighted transaction risk over well-formed records.
#[must_use]
pub fn transaction_score(records: &[TransactionRecord]) -> Option<f64> {
    let valid: Vec<&TransactionRecord> = records
        .iter()
        .filter(|r| {
            r.amount.is_finite()
                && r.amount >= 0.0
                && r.risk_score.is_finite()
                && (0.0..=1.0).contains(&r.risk_score)
        })
        .collect();
    if valid.len() < records.len() {
        tracing::debug!(
            skipped = records.len() - valid.len(),
            "ignoring malformed transaction records"
        );
    }
    if valid.is_empty() {
        return None;
    }

    let total_amount: f64 = valid.iter().map(|r| r.amount).sum();
    if total_amount > 0.0 {
        Some(valid.iter().map(|r| r.amount * r.risk_score).sum::<f64>() / total_amount)
    } else {
        #[allow(clippy::cast_precision_loss)]
        let n = valid.len() as f64;
        Some(valid.iter().map(|r| r.risk_score).sum::<f64>() / n)
    }
}

/// Whether any domain reports identity or device evidence as missing.
#[must_use]
pub fn has_penalized_gap(findings: &DomainFindings) -> bool {
    findings.iter().any(|(_, f)| {
        f.missing_evidence.iter().any(|m| {
            PENALIZED_MISSING
                .iter()
                .any(|p| m.trim().eq_ignore_ascii_case(p))
        })
    })
}

/// Combine domain and transaction scores into the final risk score.
///
/// # Errors
///
/// Returns `RiskError::InsufficientRiskData` when there is neither a usable
/// domain finding nor a usable transaction record.
pub fn calculate_risk(
    signals: &[DomainSignal],
    findings: &DomainFindings,
    transactions: &[TransactionRecord],
) -> Result<RiskBreakdown, RiskError> {
    let domain_score = weighted_domain_score(signals);
    let transaction_score = transaction_score(transactions);

    let base = match (domain_score, transaction_score) {
        (Some(d), Some(t)) => DOMAIN_BLEND * d + TRANSACTION_BLEND * t,
        (Some(d), None) => d,
        (None, Some(t)) => t,
        (None, None) => {
            return Err(RiskError::InsufficientRiskData(format!(
                "{} domain finding(s) with no usable score and {} transaction record(s)",
                findings.len(),
                transactions.len()
            )));
        }
    };

    let penalty_applied = has_penalized_gap(findings);
    let penalty = if penalty_applied {
        MISSING_EVIDENCE_PENALTY
    } else {
        0.0
    };

    Ok(RiskBreakdown {
        score: (base + penalty).clamp(0.0, 1.0),
        domain_score,
        transaction_score,
        penalty_applied,
    })
}
