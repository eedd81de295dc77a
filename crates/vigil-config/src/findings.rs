//! Domain findings write path.

use serde::{Deserialize, Serialize};

const fn default_unversioned_retry_limit() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FindingsConfig {
    /// How many times an unversioned persist re-merges after losing a
    /// version race on another domain.
    #[serde(default = "default_unversioned_retry_limit")]
    pub unversioned_retry_limit: u32,
}

impl Default for FindingsConfig {
    fn default() -> Self {
        Self {
            unversioned_retry_limit: default_unversioned_retry_limit(),
        }
    }
}
