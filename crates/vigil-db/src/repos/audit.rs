//! Audit ledger repository: append inside a write transaction, read back in
//! feed order.
//!
//! The table is append-only (triggers reject UPDATE and DELETE). Entries are
//! ordered by `(timestamp_ms, entry_id)`.

use vigil_core::entities::AuditLogEntry;
use vigil_core::enums::{ActionType, ActorType};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_version, parse_enum, parse_json, parse_optional_json, version_param};
use crate::service::InvestigationService;

const SELECT_COLS: &str = "entry_id, investigation_id, user_id, action_type, source, timestamp_ms, \
     changes_json, state_snapshot_json, from_version, to_version";

fn row_to_entry(row: &libsql::Row) -> Result<AuditLogEntry, DatabaseError> {
    Ok(AuditLogEntry {
        entry_id: row.get(0)?,
        investigation_id: row.get(1)?,
        user_id: row.get(2)?,
        action_type: parse_enum(&row.get::<String>(3)?)?,
        source: parse_enum(&row.get::<String>(4)?)?,
        timestamp_ms: row.get(5)?,
        changes: parse_json(&row.get::<String>(6)?)?,
        state_snapshot: parse_optional_json(get_opt_string(row, 7)?.as_deref())?,
        from_version: get_version(row, 8)?,
        to_version: get_version(row, 9)?,
    })
}

/// A ledger row as read for the feed.
///
/// Position columns are always present; the rest of the row may fail to
/// parse, and the feed decides what to do with that.
#[derive(Debug)]
pub struct LedgerRow {
    pub entry_id: i64,
    pub timestamp_ms: i64,
    pub parsed: Result<AuditLogEntry, DatabaseError>,
}

/// Fields of a ledger entry before the database assigns its ID.
pub(crate) struct NewEntry<'a> {
    pub investigation_id: &'a str,
    pub user_id: &'a str,
    pub action_type: ActionType,
    pub source: ActorType,
    pub timestamp_ms: i64,
    pub changes: &'a serde_json::Value,
    pub state_snapshot: Option<&'a serde_json::Value>,
    pub from_version: u64,
    pub to_version: u64,
}

/// Append one entry on the transaction's connection. Returns its `entry_id`.
pub(crate) async fn insert_entry(
    conn: &libsql::Connection,
    entry: &NewEntry<'_>,
) -> Result<i64, DatabaseError> {
    let changes = serde_json::to_string(entry.changes)?;
    let snapshot = entry.state_snapshot.map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO audit_log (investigation_id, user_id, action_type, source, timestamp_ms,
             changes_json, state_snapshot_json, from_version, to_version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        libsql::params![
            entry.investigation_id,
            entry.user_id,
            entry.action_type.as_str(),
            entry.source.as_str(),
            entry.timestamp_ms,
            changes,
            snapshot,
            version_param(entry.from_version)?,
            version_param(entry.to_version)?
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

/// Newest ledger timestamp for an investigation, if any.
pub(crate) async fn last_timestamp(
    conn: &libsql::Connection,
    investigation_id: &str,
) -> Result<Option<i64>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT MAX(timestamp_ms) FROM audit_log WHERE investigation_id = ?1",
            [investigation_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<Option<i64>>(0)?)
}

impl InvestigationService {
    /// Every ledger entry for an investigation, in feed order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or any row is malformed.
    pub async fn entries_for(&self, investigation_id: &str) -> Result<Vec<AuditLogEntry>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log WHERE investigation_id = ?1
                     ORDER BY timestamp_ms ASC, entry_id ASC"
                ),
                [investigation_id],
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_entry(&row)?);
        }
        Ok(entries)
    }

    /// Number of ledger entries for an investigation.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count_entries(&self, investigation_id: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM audit_log WHERE investigation_id = ?1",
                [investigation_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        get_version(&row, 0)
    }

    /// Up to `limit` entries strictly after position `after`, in feed order.
    ///
    /// `after` is `(timestamp_ms, entry_id)`; `None` starts at the beginning.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or a position column
    /// cannot be read. Other malformed columns are reported per row.
    pub async fn entries_after(
        &self,
        investigation_id: &str,
        after: Option<(i64, i64)>,
        limit: u32,
    ) -> Result<Vec<LedgerRow>, DatabaseError> {
        let (after_ts, after_id) = after.unwrap_or((i64::MIN, i64::MIN));
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_log
                     WHERE investigation_id = ?1
                       AND (timestamp_ms > ?2 OR (timestamp_ms = ?2 AND entry_id > ?3))
                     ORDER BY timestamp_ms ASC, entry_id ASC
                     LIMIT ?4"
                ),
                libsql::params![investigation_id, after_ts, after_id, i64::from(limit)],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(LedgerRow {
                entry_id: row.get(0)?,
                timestamp_ms: row.get(5)?,
                parsed: row_to_entry(&row),
            });
        }
        Ok(out)
    }
}
