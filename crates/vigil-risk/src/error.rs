//! Risk fusion error types.

use thiserror::Error;
use vigil_core::errors::ErrorKind;

#[derive(Debug, Error, PartialEq)]
pub enum RiskError {
    /// No usable domain finding and no transaction data. A score of 0 would
    /// read as "safe", so no score is produced at all.
    #[error("Insufficient risk data: {0}")]
    InsufficientRiskData(String),

    /// None of the confidence factors could be computed.
    #[error("Confidence data insufficient: no confidence factor available")]
    ConfidenceDataInsufficient,
}

impl RiskError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientRiskData(_) | Self::ConfidenceDataInsufficient => {
                ErrorKind::BadRequest
            }
        }
    }
}
