//! Cross-cutting error classification.
//!
//! Errors live in their own crates (`DatabaseError`, `FeedError`,
//! `LockError`, `RiskError`). Every one of them maps onto an [`ErrorKind`] so
//! hosts can tell "retry with a fresh version" apart from "bad request" and
//! "try later".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-facing classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Re-read state and retry with the current version.
    RetryWithFreshVersion,
    /// The request itself is wrong; retrying will not help.
    BadRequest,
    NotFound,
    Forbidden,
    /// Temporary condition (lock contention, busy database); retry later.
    Transient,
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RetryWithFreshVersion => "retry_with_fresh_version",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Transient => "transient",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
