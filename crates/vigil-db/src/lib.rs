//! # vigil-db
//!
//! libSQL storage for Vigil investigation state.
//!
//! Holds the mutable investigation projection, the append-only audit ledger
//! written atomically with every state change, the per-domain findings write
//! path, and the cursor-paginated event feed built on top of the ledger.
//!
//! Writes never share a connection: each one opens a fresh connection and
//! runs inside its own `BEGIN IMMEDIATE` transaction, so concurrent writers
//! in one process behave exactly like writers in different processes.

pub mod error;
pub mod feed;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;
pub mod telemetry;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Busy timeout applied to every connection, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Central database handle.
///
/// Keeps one long-lived connection for reads and migrations, and hands out
/// fresh connections for write transactions.
pub struct VigilDb {
    db: libsql::Database,
    conn: libsql::Connection,
    path: String,
}

impl VigilDb {
    /// Open a local database file, creating it if needed.
    ///
    /// Enables WAL mode and runs migrations on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if let Some(parent) = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Other(e.into()))?;
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure_connection(&conn).await?;

        // WAL lets readers proceed while a writer holds the write lock.
        let mut rows = conn
            .query("PRAGMA journal_mode = WAL", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
        while rows.next().await?.is_some() {}

        let vigil_db = Self {
            db,
            conn,
            path: path.to_string(),
        };
        vigil_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(vigil_db)
    }

    /// The shared read connection.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Open a fresh, fully configured connection for one write transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened or configured.
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.db.connect()?;
        configure_connection(&conn).await?;
        Ok(conn)
    }

    /// Path the database was opened from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"inv-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// Per-connection settings. `SQLite` does not persist these in the file.
async fn configure_connection(conn: &libsql::Connection) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

    let mut rows = conn
        .query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"), ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
    while rows.next().await?.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::helpers::temp_db;

    #[tokio::test]
    async fn open_local_creates_schema() {
        let (_dir, db) = temp_db().await;
        for table in ["investigations", "audit_log"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let (_dir, db) = temp_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_format_and_uniqueness() {
        let (_dir, db) = temp_db().await;
        let mut ids = HashSet::new();
        for _ in 0..50 {
            let id = db.generate_id("inv").await.unwrap();
            assert!(id.starts_with("inv-"));
            assert_eq!(id.len(), 12);
            assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
            assert!(ids.insert(id));
        }
    }

    #[tokio::test]
    async fn audit_log_rejects_update_and_delete() {
        let (_dir, db) = temp_db().await;
        db.conn()
            .execute(
                "INSERT INTO investigations (id, owner_user_id) VALUES ('inv-1', 'u1')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms, changes_json, from_version, to_version)
                 VALUES ('inv-1', 'u1', 'annotated', 'user', 1, '{}', 0, 1)",
                (),
            )
            .await
            .unwrap();

        assert!(db.conn().execute("UPDATE audit_log SET user_id = 'x'", ()).await.is_err());
        assert!(db.conn().execute("DELETE FROM audit_log", ()).await.is_err());
        assert!(db.conn().execute("DELETE FROM investigations", ()).await.is_err());
    }

    #[tokio::test]
    async fn fresh_connections_see_committed_writes() {
        let (_dir, db) = temp_db().await;
        let writer = db.connect().await.unwrap();
        writer
            .execute(
                "INSERT INTO investigations (id, owner_user_id) VALUES ('inv-2', 'u1')",
                (),
            )
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT owner_user_id FROM investigations WHERE id = 'inv-2'", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "u1");
    }
}
