//! File lock retry tuning.

use serde::{Deserialize, Serialize};

const fn default_max_retries() -> u32 {
    5
}

const fn default_base_backoff_ms() -> u64 {
    100
}

const fn default_max_backoff_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileLockConfig {
    /// Lock attempts before giving up with a timeout.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay after the first failed attempt; doubles per attempt.
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Cap on the per-attempt delay (before jitter).
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for FileLockConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
