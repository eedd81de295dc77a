//! Shared test utilities for vigil-db unit tests.

pub(crate) mod helpers {
    use tempfile::TempDir;

    use crate::VigilDb;
    use crate::service::InvestigationService;
    use crate::telemetry::TelemetryJournal;

    /// Open a database file inside a fresh temp dir. Keep the `TempDir` alive
    /// for the duration of the test.
    pub async fn temp_db() -> (TempDir, VigilDb) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.db");
        let db = VigilDb::open_local(path.to_str().unwrap()).await.unwrap();
        (dir, db)
    }

    /// Service over a temp database with the journal disabled.
    pub async fn test_service() -> (TempDir, InvestigationService) {
        let (dir, db) = temp_db().await;
        (dir, InvestigationService::from_db(db, TelemetryJournal::disabled()))
    }
}
