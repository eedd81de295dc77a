//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all vigil-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a required JSON document column into a typed value.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column contains invalid JSON for `T`.
pub fn parse_json<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_json(s)?)),
        _ => Ok(None),
    }
}

/// Read an INTEGER version column as `u64`.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for negative values.
pub fn get_version(row: &libsql::Row, idx: i32) -> Result<u64, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u64::try_from(raw)
        .map_err(|_| DatabaseError::InvalidState(format!("negative version {raw} in column {idx}")))
}

/// Convert a version for binding as an SQL INTEGER.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the version exceeds `i64::MAX`.
pub fn version_param(version: u64) -> Result<i64, DatabaseError> {
    i64::try_from(version)
        .map_err(|_| DatabaseError::InvalidState(format!("version {version} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::enums::InvestigationStatus;

    #[test]
    fn parses_both_datetime_formats() {
        assert!(parse_datetime("2026-02-09T14:30:00+00:00").is_ok());
        assert!(parse_datetime("2026-02-09 14:30:00").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn parses_snake_case_enums() {
        assert!(parse_enum::<InvestigationStatus>("in_progress").is_err());
        let status: InvestigationStatus = parse_enum("running").unwrap();
        assert_eq!(status, InvestigationStatus::Running);
    }

    #[test]
    fn version_bounds() {
        assert_eq!(version_param(7).unwrap(), 7);
        assert!(version_param(u64::MAX).is_err());
    }
}
