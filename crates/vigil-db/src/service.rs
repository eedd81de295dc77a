//! Service layer orchestrating investigation writes with ledger and journal.
//!
//! `InvestigationService` wraps `VigilDb` (database access) and
//! `TelemetryJournal` (best-effort JSONL copy). All repo methods are
//! implemented as `impl InvestigationService` blocks under `repos/`.

use std::path::PathBuf;

use vigil_config::FindingsConfig;
use vigil_core::entities::AuditLogEntry;
use vigil_lock::FileLocker;

use crate::VigilDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;
use crate::telemetry::TelemetryJournal;

/// Orchestrates investigation mutations.
///
/// Every mutation follows this protocol:
/// 1. Open a fresh connection and `BEGIN IMMEDIATE`
/// 2. Check the caller's version against the stored row
/// 3. Update the row and append the ledger entry
/// 4. Commit (or roll back on any failure)
/// 5. Mirror the entry into the telemetry journal; failures only log
pub struct InvestigationService {
    db: VigilDb,
    journal: TelemetryJournal,
    findings: FindingsConfig,
    retry: RetryConfig,
}

impl InvestigationService {
    /// Open a local database and optionally a journal directory.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or the
    /// journal directory cannot be created.
    pub async fn new_local(
        db_path: &str,
        journal_dir: Option<PathBuf>,
        locker: FileLocker,
    ) -> Result<Self, DatabaseError> {
        let db = VigilDb::open_local(db_path).await?;
        let journal = match journal_dir {
            Some(dir) => TelemetryJournal::new(dir, locker)?,
            None => TelemetryJournal::disabled(),
        };
        Ok(Self::from_db(db, journal))
    }

    #[must_use]
    pub fn from_db(db: VigilDb, journal: TelemetryJournal) -> Self {
        Self {
            db,
            journal,
            findings: FindingsConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_findings_config(mut self, findings: FindingsConfig) -> Self {
        self.findings = findings;
        self
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn db(&self) -> &VigilDb {
        &self.db
    }

    #[must_use]
    pub const fn journal(&self) -> &TelemetryJournal {
        &self.journal
    }

    #[must_use]
    pub const fn findings_config(&self) -> &FindingsConfig {
        &self.findings
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Second phase of a write: copy the committed entry to the journal.
    ///
    /// Never fails the caller. A journal error is logged and dropped.
    pub(crate) async fn mirror_to_journal(&self, entry: &AuditLogEntry) {
        if !self.journal.is_enabled() {
            return;
        }
        let journal = self.journal.clone();
        let entry = entry.clone();
        let investigation_id = entry.investigation_id.clone();
        let to_version = entry.to_version;

        match tokio::task::spawn_blocking(move || journal.record(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(%investigation_id, to_version, error = %e, "telemetry journal append failed");
            }
            Err(e) => {
                tracing::warn!(%investigation_id, to_version, error = %e, "telemetry journal task failed");
            }
        }
    }
}
