//! Transient lock-contention retry logic.
//!
//! Concurrent writers in other processes can briefly hold the SQLite write
//! lock past the busy timeout. Those failures surface as `database is locked`
//! and resolve on their own, so the whole write transaction is retried with
//! capped exponential backoff.
//!
//! Version conflicts are NOT transient: they are returned to the caller.

use std::time::Duration;

/// Configuration for retry behavior on transient lock errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(20),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect busy/locked database errors.
///
/// The predicate is intentionally narrow to avoid retrying genuine
/// SQL or constraint errors.
pub fn is_transient_lock_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("SQLITE_BUSY")
}
