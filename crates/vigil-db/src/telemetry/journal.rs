//! JSONL journal writer.
//!
//! Appends [`JournalRecord`]s to `{journal_dir}/{investigation_id}.jsonl`.
//! Appends from several processes are serialized with a sidecar
//! `{investigation_id}.jsonl.lock` file taken through [`FileLocker`].

use std::path::{Path, PathBuf};

use vigil_core::entities::AuditLogEntry;
use vigil_lock::FileLocker;

use super::JournalRecord;
use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct TelemetryJournal {
    dir: PathBuf,
    enabled: bool,
    locker: FileLocker,
}

impl TelemetryJournal {
    /// Create a journal writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created.
    pub fn new(dir: PathBuf, locker: FileLocker) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&dir).map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(Self {
            dir,
            enabled: true,
            locker,
        })
    }

    /// A journal that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
            locker: FileLocker::default(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Journal file for one investigation.
    #[must_use]
    pub fn path_for(&self, investigation_id: &str) -> PathBuf {
        self.dir.join(format!("{investigation_id}.jsonl"))
    }

    /// Append one ledger entry under the investigation's journal lock.
    ///
    /// Blocks while waiting for the lock; call from `spawn_blocking` in
    /// async code.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Other` if the lock cannot be taken or the
    /// append fails.
    pub fn record(&self, entry: &AuditLogEntry) -> Result<(), DatabaseError> {
        if !self.enabled {
            return Ok(());
        }

        let path = self.path_for(&entry.investigation_id);
        let lock_path = self.dir.join(format!("{}.jsonl.lock", entry.investigation_id));
        let record = JournalRecord::from(entry);

        self.locker
            .with_lock(&lock_path, true, |_| {
                serde_jsonlines::append_json_lines(&path, [&record])
            })
            .map_err(|e| DatabaseError::Other(e.into()))?
            .map_err(|e| DatabaseError::Other(e.into()))
    }

    /// Read back every journaled record for an investigation.
    ///
    /// A missing file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Other` if the file exists but a line cannot
    /// be read or parsed.
    pub fn records(&self, investigation_id: &str) -> Result<Vec<JournalRecord>, DatabaseError> {
        let path = self.path_for(investigation_id);
        if !self.enabled || !path.exists() {
            return Ok(Vec::new());
        }
        serde_jsonlines::json_lines(&path)
            .map_err(|e| DatabaseError::Other(e.into()))?
            .collect::<std::io::Result<Vec<JournalRecord>>>()
            .map_err(|e| DatabaseError::Other(e.into()))
    }
}
