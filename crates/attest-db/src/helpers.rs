//! Row-to-entity parsing helpers.
//!
//! Repos convert `libsql::Row` (column-indexed) into typed entity structs.
//! These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use attest_core::entities::LedgerEvent;
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Column list shared by every `audit_logs` SELECT, in `row_to_event` order.
pub const EVENT_COLUMNS: &str = "id, organization_id, ledger_seq, actor_id, event_name, \
     target_type, target_id, metadata, created_at, prev_hash, hash, severity, category, outcome";

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-08-26T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-08-26 14:30:00"`).
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
/// Works with all attest-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
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

/// Parse the metadata TEXT column. NULL and empty string both mean the
/// empty document; the encoder never sees `null` metadata.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_metadata(s: Option<&str>) -> Result<serde_json::Value, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => serde_json::from_str(s)
            .map_err(|e| DatabaseError::Query(format!("Invalid JSON in metadata column: {e}"))),
        _ => Ok(serde_json::json!({})),
    }
}

/// Convert an `audit_logs` row (selected via [`EVENT_COLUMNS`]) into a
/// `LedgerEvent`.
///
/// # Errors
///
/// Returns `DatabaseError` if a column read or parse fails.
pub fn row_to_event(row: &libsql::Row) -> Result<LedgerEvent, DatabaseError> {
    Ok(LedgerEvent {
        id: row.get::<String>(0)?,
        organization_id: row.get::<String>(1)?,
        ledger_seq: row.get::<i64>(2)?,
        actor_id: get_opt_string(row, 3)?,
        event_name: row.get::<String>(4)?,
        target_type: row.get::<String>(5)?,
        target_id: get_opt_string(row, 6)?,
        metadata: parse_metadata(get_opt_string(row, 7)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        prev_hash: row.get::<String>(9)?,
        hash: row.get::<String>(10)?,
        severity: parse_enum(&row.get::<String>(11)?)?,
        category: parse_enum(&row.get::<String>(12)?)?,
        outcome: parse_enum(&row.get::<String>(13)?)?,
    })
}
