//! Ledger event queries.
//!
//! Read-only lookups and filtered listings. Chain-ordered fetches feed the
//! verifier and the exporter; filtered listings feed dashboards.

use attest_core::entities::LedgerEvent;
use attest_core::enums::{Category, Outcome, Severity};
use chrono::{DateTime, Utc};

use crate::error::DatabaseError;
use crate::helpers::{EVENT_COLUMNS, row_to_event};
use crate::service::LedgerService;

/// Filter criteria for ledger queries.
#[derive(Debug, Default)]
pub struct LedgerFilter {
    /// Match event names starting with this prefix (e.g. `"auth."`).
    pub event_prefix: Option<String>,
    pub category: Option<Category>,
    pub severity: Option<Severity>,
    pub outcome: Option<Outcome>,
    pub actor_id: Option<String>,
    pub target_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl LedgerService {
    /// Fetch one event by id within an organization.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the event does not exist.
    pub async fn get_event(
        &self,
        organization_id: &str,
        event_id: &str,
    ) -> Result<LedgerEvent, DatabaseError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_logs WHERE organization_id = ?1 AND id = ?2"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![organization_id, event_id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_event(&row)
    }

    /// Fetch the event whose `hash` matches, within an organization.
    /// Used by verification to resolve `prev_hash` links.
    pub(crate) async fn get_event_by_hash(
        &self,
        organization_id: &str,
        hash: &str,
    ) -> Result<Option<LedgerEvent>, DatabaseError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_logs WHERE organization_id = ?1 AND hash = ?2"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![organization_id, hash])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_event(&row)?)),
            None => Ok(None),
        }
    }

    /// Fetch an organization's full chain in `ledger_seq` ascending order.
    pub async fn chain_events(
        &self,
        organization_id: &str,
    ) -> Result<Vec<LedgerEvent>, DatabaseError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_logs
             WHERE organization_id = ?1 ORDER BY ledger_seq ASC"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![organization_id])
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }
        Ok(events)
    }

    /// Query ledger events with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_events(
        &self,
        organization_id: &str,
        filter: &LedgerFilter,
    ) -> Result<Vec<LedgerEvent>, DatabaseError> {
        let mut conditions = vec!["organization_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> =
            vec![libsql::Value::Text(organization_id.to_string())];

        if let Some(ref prefix) = filter.event_prefix {
            params.push(libsql::Value::Text(format!("{prefix}%")));
            conditions.push(format!("event_name LIKE ?{}", params.len()));
        }
        if let Some(category) = filter.category {
            params.push(libsql::Value::Text(category.as_str().to_string()));
            conditions.push(format!("category = ?{}", params.len()));
        }
        if let Some(severity) = filter.severity {
            params.push(libsql::Value::Text(severity.as_str().to_string()));
            conditions.push(format!("severity = ?{}", params.len()));
        }
        if let Some(outcome) = filter.outcome {
            params.push(libsql::Value::Text(outcome.as_str().to_string()));
            conditions.push(format!("outcome = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor_id {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor_id = ?{}", params.len()));
        }
        if let Some(ref target_type) = filter.target_type {
            params.push(libsql::Value::Text(target_type.clone()));
            conditions.push(format!("target_type = ?{}", params.len()));
        }
        if let Some(since) = filter.since {
            params.push(libsql::Value::Text(since.to_rfc3339()));
            conditions.push(format!("created_at >= ?{}", params.len()));
        }
        if let Some(until) = filter.until {
            params.push(libsql::Value::Text(until.to_rfc3339()));
            conditions.push(format!("created_at < ?{}", params.len()));
        }

        let where_clause = conditions.join(" AND ");
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM audit_logs
             WHERE {where_clause}
             ORDER BY ledger_seq DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(row_to_event(&row)?);
        }
        Ok(events)
    }
}
