//! Lock error types.

use std::path::PathBuf;

use thiserror::Error;
use vigil_core::errors::ErrorKind;

#[derive(Debug, Error)]
pub enum LockError {
    /// Every attempt found the lock held by someone else.
    #[error("Timed out acquiring lock on {} after {attempts} attempts", path.display())]
    Timeout { path: PathBuf, attempts: u32 },

    /// The path does not exist and the caller asked not to create it.
    #[error("Lock target does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    /// All sequence-numbered candidates already exist.
    #[error("No free path for {} within {max_sequence} sequence numbers", base.display())]
    SequenceExhausted { base: PathBuf, max_sequence: u32 },

    /// Opening or locking failed for a reason other than contention.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Transient,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::SequenceExhausted { .. } => ErrorKind::BadRequest,
            Self::Io { .. } => ErrorKind::Internal,
        }
    }
}
