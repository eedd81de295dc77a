//! Storage locations.

use serde::{Deserialize, Serialize};

fn default_database_path() -> String {
    ".vigil/vigil.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// libSQL database file holding investigations and the audit ledger.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory for the best-effort JSONL telemetry journal.
    /// Empty disables the journal.
    #[serde(default)]
    pub journal_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            journal_dir: String::new(),
        }
    }
}

impl StorageConfig {
    /// Whether the telemetry journal is enabled.
    #[must_use]
    pub fn has_journal(&self) -> bool {
        !self.journal_dir.is_empty()
    }
}
