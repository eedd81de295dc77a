//! Investigation repository: creation, reads, and the versioned write path.
//!
//! `write` is the only way state changes. It runs one `BEGIN IMMEDIATE`
//! transaction on a fresh connection that checks the caller's version,
//! applies the change set, bumps the version by one, and appends exactly one
//! ledger entry. Either both the row and the entry commit or neither does.

use chrono::Utc;
use libsql::TransactionBehavior;
use serde::Serialize;

use vigil_core::entities::{AuditLogEntry, Investigation};
use vigil_core::enums::{InvestigationStatus, LifecycleStage};
use vigil_core::ids::PREFIX_INVESTIGATION;

use crate::error::DatabaseError;
use crate::helpers::{get_version, parse_datetime, parse_enum, parse_json, version_param};
use crate::repos::audit::{NewEntry, insert_entry, last_timestamp};
use crate::service::InvestigationService;
use crate::updates::investigation::{InvestigationChanges, StateMutation};

const SELECT_COLS: &str = "id, owner_user_id, status, lifecycle_stage, version, \
     progress_json, results_json, created_at, updated_at";

fn row_to_investigation(row: &libsql::Row) -> Result<Investigation, DatabaseError> {
    Ok(Investigation {
        id: row.get(0)?,
        owner_user_id: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        lifecycle_stage: parse_enum(&row.get::<String>(3)?)?,
        version: get_version(row, 4)?,
        progress: parse_json(&row.get::<String>(5)?)?,
        results: parse_json(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

async fn select_investigation(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<Investigation>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM investigations WHERE id = ?1"),
            [id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_investigation(&row)?)),
        None => Ok(None),
    }
}

/// Result of an accepted write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteOutcome {
    pub new_version: u64,
    pub investigation: Investigation,
    pub entry: AuditLogEntry,
}

/// Apply a change set to a copy of the current state.
fn apply_changes(
    current: &Investigation,
    changes: &InvestigationChanges,
) -> Result<Investigation, DatabaseError> {
    let mut next = current.clone();

    if let Some(status) = changes.status {
        if !current.status.can_transition_to(status) {
            return Err(DatabaseError::InvalidTransition {
                investigation_id: current.id.clone(),
                from: current.status.to_string(),
                to: status.to_string(),
            });
        }
        next.status = status;
    }
    if let Some(stage) = changes.lifecycle_stage {
        next.lifecycle_stage = stage;
    }
    if let Some(ref progress) = changes.progress {
        next.progress.merge(progress.clone());
    }
    if let Some(ref results) = changes.results {
        next.results.merge(results.clone());
    }
    if changes.finalize {
        next.results.merge(next.progress.clone());
    }
    Ok(next)
}

impl InvestigationService {
    /// Register a new investigation at version 0 (`pending`, `submitted`).
    ///
    /// Creation is not a versioned write and appends no ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if `investigation_id` is already
    /// taken or `owner_user_id` is empty.
    pub async fn create_investigation(
        &self,
        owner_user_id: &str,
        investigation_id: Option<&str>,
    ) -> Result<Investigation, DatabaseError> {
        if owner_user_id.trim().is_empty() {
            return Err(DatabaseError::Validation("owner_user_id must not be empty".into()));
        }
        let id = match investigation_id {
            Some(id) if id.trim().is_empty() => {
                return Err(DatabaseError::Validation("investigation_id must not be empty".into()));
            }
            Some(id) => id.to_string(),
            None => self.db().generate_id(PREFIX_INVESTIGATION).await?,
        };
        if self.find_investigation(&id).await?.is_some() {
            return Err(DatabaseError::Validation(format!("investigation {id} already exists")));
        }

        let now = Utc::now();
        let investigation = Investigation {
            id: id.clone(),
            owner_user_id: owner_user_id.to_string(),
            status: InvestigationStatus::Pending,
            lifecycle_stage: LifecycleStage::Submitted,
            version: 0,
            progress: Default::default(),
            results: Default::default(),
            created_at: now,
            updated_at: now,
        };

        self.db()
            .conn()
            .execute(
                "INSERT INTO investigations (id, owner_user_id, status, lifecycle_stage, version,
                     progress_json, results_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, '{}', '{}', ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    owner_user_id,
                    investigation.status.as_str(),
                    investigation.lifecycle_stage.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        tracing::debug!(investigation_id = %id, owner = owner_user_id, "investigation created");
        Ok(investigation)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no investigation has this ID.
    pub async fn get_investigation(&self, id: &str) -> Result<Investigation, DatabaseError> {
        self.find_investigation(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row is malformed.
    pub async fn find_investigation(&self, id: &str) -> Result<Option<Investigation>, DatabaseError> {
        select_investigation(self.db().conn(), id).await
    }

    /// Most recently updated investigations first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a row is malformed.
    pub async fn list_investigations(
        &self,
        status: Option<InvestigationStatus>,
        limit: u32,
    ) -> Result<Vec<Investigation>, DatabaseError> {
        let mut rows = match status {
            Some(status) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM investigations WHERE status = ?1
                             ORDER BY updated_at DESC, id ASC LIMIT ?2"
                        ),
                        libsql::params![status.as_str(), i64::from(limit)],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SELECT_COLS} FROM investigations
                             ORDER BY updated_at DESC, id ASC LIMIT ?1"
                        ),
                        [i64::from(limit)],
                    )
                    .await?
            }
        };

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_investigation(&row)?);
        }
        Ok(out)
    }

    /// Apply `mutation` if `expected_version` matches the stored version.
    ///
    /// A busy database retries the whole transaction with capped backoff. A
    /// stale version is never retried here: it is returned as
    /// `DatabaseError::VersionConflict` for the caller to re-read.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if the investigation does not exist
    /// - `DatabaseError::VersionConflict` if `expected_version` is stale
    /// - `DatabaseError::InvalidTransition` for a disallowed status change
    /// - any storage error, after which nothing has changed
    pub async fn write(
        &self,
        investigation_id: &str,
        mutation: &StateMutation,
        expected_version: u64,
    ) -> Result<WriteOutcome, DatabaseError> {
        let retry = self.retry_config();
        let mut attempt = 0_u32;

        let outcome = loop {
            match self.write_once(investigation_id, mutation, expected_version).await {
                Ok(outcome) => break outcome,
                Err(e) if e.is_transient() && attempt + 1 < retry.max_attempts => {
                    let delay = retry.delay(attempt);
                    tracing::warn!(
                        investigation_id,
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "database busy, retrying write"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        tracing::debug!(
            investigation_id,
            action = %mutation.action_type,
            new_version = outcome.new_version,
            "write committed"
        );
        self.mirror_to_journal(&outcome.entry).await;
        Ok(outcome)
    }

    async fn write_once(
        &self,
        investigation_id: &str,
        mutation: &StateMutation,
        expected_version: u64,
    ) -> Result<WriteOutcome, DatabaseError> {
        let conn = self.db().connect().await?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;

        match apply_in_tx(&tx, investigation_id, mutation, expected_version).await {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!(investigation_id, error = %rb, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Check that the ledger forms one gap-free chain ending at the current
    /// version. Returns the number of entries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ChainBroken` naming the first bad link, or
    /// `DatabaseError::NotFound` if the investigation does not exist.
    pub async fn verify_chain(&self, investigation_id: &str) -> Result<usize, DatabaseError> {
        let investigation = self.get_investigation(investigation_id).await?;
        let entries = self.entries_for(investigation_id).await?;

        let mut expected_from = 0_u64;
        for entry in &entries {
            if entry.from_version != expected_from {
                return Err(DatabaseError::ChainBroken {
                    investigation_id: investigation_id.to_string(),
                    at_version: expected_from,
                    detail: format!(
                        "entry {} starts at version {}",
                        entry.entry_id, entry.from_version
                    ),
                });
            }
            if entry.to_version != entry.from_version + 1 {
                return Err(DatabaseError::ChainBroken {
                    investigation_id: investigation_id.to_string(),
                    at_version: entry.from_version,
                    detail: format!(
                        "entry {} jumps to version {}",
                        entry.entry_id, entry.to_version
                    ),
                });
            }
            expected_from = entry.to_version;
        }

        if expected_from != investigation.version {
            return Err(DatabaseError::ChainBroken {
                investigation_id: investigation_id.to_string(),
                at_version: expected_from,
                detail: format!("stored version is {}", investigation.version),
            });
        }
        Ok(entries.len())
    }
}

async fn apply_in_tx(
    conn: &libsql::Connection,
    investigation_id: &str,
    mutation: &StateMutation,
    expected_version: u64,
) -> Result<WriteOutcome, DatabaseError> {
    let current = select_investigation(conn, investigation_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(investigation_id.to_string()))?;

    if current.version != expected_version {
        return Err(DatabaseError::VersionConflict {
            investigation_id: investigation_id.to_string(),
            expected: expected_version,
            actual: current.version,
        });
    }

    let now = Utc::now();
    let new_version = expected_version + 1;
    let mut next = apply_changes(&current, &mutation.changes)?;
    next.version = new_version;
    next.updated_at = now;

    let updated = conn
        .execute(
            "UPDATE investigations
             SET status = ?1, lifecycle_stage = ?2, version = ?3,
                 progress_json = ?4, results_json = ?5, updated_at = ?6
             WHERE id = ?7 AND version = ?8",
            libsql::params![
                next.status.as_str(),
                next.lifecycle_stage.as_str(),
                version_param(new_version)?,
                serde_json::to_string(&next.progress)?,
                serde_json::to_string(&next.results)?,
                now.to_rfc3339(),
                investigation_id,
                version_param(expected_version)?
            ],
        )
        .await?;
    if updated != 1 {
        return Err(DatabaseError::InvalidState(format!(
            "version check passed but update matched {updated} rows for {investigation_id}"
        )));
    }

    // Clock skew between processes must never reorder the chain.
    let timestamp_ms = last_timestamp(conn, investigation_id)
        .await?
        .map_or(now.timestamp_millis(), |last| last.max(now.timestamp_millis()));

    let changes = serde_json::to_value(&mutation.changes)?;
    let state_snapshot = if mutation.changes.touches_lifecycle() {
        Some(serde_json::to_value(&next)?)
    } else {
        None
    };

    let entry_id = insert_entry(
        conn,
        &NewEntry {
            investigation_id,
            user_id: &mutation.actor.id,
            action_type: mutation.action_type,
            source: mutation.actor.actor_type,
            timestamp_ms,
            changes: &changes,
            state_snapshot: state_snapshot.as_ref(),
            from_version: expected_version,
            to_version: new_version,
        },
    )
    .await?;

    Ok(WriteOutcome {
        new_version,
        entry: AuditLogEntry {
            entry_id,
            investigation_id: investigation_id.to_string(),
            user_id: mutation.actor.id.clone(),
            action_type: mutation.action_type,
            source: mutation.actor.actor_type,
            timestamp_ms,
            changes,
            state_snapshot,
            from_version: expected_version,
            to_version: new_version,
        },
        investigation: next,
    })
}
