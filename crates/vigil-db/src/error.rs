//! Database error types for vigil-db.

use thiserror::Error;
use vigil_core::errors::ErrorKind;

use crate::retry::is_transient_lock_error;

/// Errors from state, ledger, and findings operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The caller's known version is stale. Re-read and retry.
    #[error(
        "Version conflict on investigation {investigation_id}: expected {expected}, found {actual}"
    )]
    VersionConflict {
        investigation_id: String,
        expected: u64,
        actual: u64,
    },

    /// No investigation with this ID.
    #[error("Investigation not found: {0}")]
    NotFound(String),

    /// Requested status change is not allowed from the current status.
    #[error("Invalid status transition for {investigation_id}: {from} -> {to}")]
    InvalidTransition {
        investigation_id: String,
        from: String,
        to: String,
    },

    /// The ledger does not form a gap-free version chain.
    #[error("Ledger chain broken for {investigation_id} at version {at_version}: {detail}")]
    ChainBroken {
        investigation_id: String,
        at_version: u64,
        detail: String,
    },

    /// Caller input rejected before touching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// JSON (de)serialization of a stored document failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether the failure is a busy/locked database that resolves on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LibSql(e) if is_transient_lock_error(e))
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VersionConflict { .. } => ErrorKind::RetryWithFreshVersion,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition { .. } | Self::Validation(_) => ErrorKind::BadRequest,
            _ if self.is_transient() => ErrorKind::Transient,
            _ => ErrorKind::Internal,
        }
    }
}
