//! Derived compliance reporting.
//!
//! Pure read/aggregate functions over ledger events. Aggregates do not
//! require a passing integrity check to run; the chain status is surfaced
//! alongside the numbers as a trust signal. Summaries are memoized per
//! `(organization, window)` with explicit invalidation on material appends.

use attest_core::entities::{ComplianceSummary, GroupCount, HazardDriver, ReportingWindow};
use chrono::Utc;

use crate::error::DatabaseError;
use crate::service::LedgerService;

impl LedgerService {
    /// Build (or fetch from cache) the executive compliance summary for one
    /// organization and reporting window.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any aggregate query fails.
    pub async fn compliance_summary(
        &self,
        organization_id: &str,
        window: &ReportingWindow,
    ) -> Result<ComplianceSummary, DatabaseError> {
        if let Some(cached) = self.cache().get(organization_id, window) {
            return Ok(cached);
        }

        let now = Utc::now();
        let total_events = self.count_in_window(organization_id, window).await?;
        let by_category = self
            .group_counts(organization_id, window, "category")
            .await?;
        let by_severity = self
            .group_counts(organization_id, window, "severity")
            .await?;
        let by_outcome = self.group_counts(organization_id, window, "outcome").await?;
        let top_hazards = self.top_hazards(organization_id, window).await?;

        let previous = window.previous(now);
        let previous_period_total = self.count_in_window(organization_id, &previous).await?;

        let ledger_integrity = self.verify_chain(organization_id).await?.status;

        let summary = ComplianceSummary {
            organization_id: organization_id.to_string(),
            window: window.clone(),
            total_events,
            by_category,
            by_severity,
            by_outcome,
            top_hazards,
            previous_period_total,
            period_delta: total_events as i64 - previous_period_total as i64,
            ledger_integrity,
            generated_at: now,
        };
        self.cache().put(summary.clone());
        Ok(summary)
    }

    async fn count_in_window(
        &self,
        organization_id: &str,
        window: &ReportingWindow,
    ) -> Result<u64, DatabaseError> {
        let (clause, params) = window_clause(organization_id, window);
        let sql = format!("SELECT COUNT(*) FROM audit_logs WHERE {clause}");
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?.max(0) as u64)
    }

    /// Count events grouped by one classification column, descending.
    ///
    /// `column` is a compile-time constant name, never user input.
    async fn group_counts(
        &self,
        organization_id: &str,
        window: &ReportingWindow,
        column: &str,
    ) -> Result<Vec<GroupCount>, DatabaseError> {
        let (clause, params) = window_clause(organization_id, window);
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM audit_logs
             WHERE {clause}
             GROUP BY {column} ORDER BY COUNT(*) DESC, {column} ASC"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next().await? {
            counts.push(GroupCount {
                key: row.get::<String>(0)?,
                count: row.get::<i64>(1)?.max(0) as u64,
            });
        }
        Ok(counts)
    }

    /// Extract top hazard drivers by grouping metadata `reason` codes.
    async fn top_hazards(
        &self,
        organization_id: &str,
        window: &ReportingWindow,
    ) -> Result<Vec<HazardDriver>, DatabaseError> {
        let (clause, params) = window_clause(organization_id, window);
        let limit = self.top_hazard_limit();
        let sql = format!(
            "SELECT json_extract(metadata, '$.reason') AS reason, COUNT(*)
             FROM audit_logs
             WHERE {clause} AND json_extract(metadata, '$.reason') IS NOT NULL
             GROUP BY reason ORDER BY COUNT(*) DESC, reason ASC LIMIT {limit}"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut hazards = Vec::new();
        while let Some(row) = rows.next().await? {
            hazards.push(HazardDriver {
                reason: row.get::<String>(0)?,
                count: row.get::<i64>(1)?.max(0) as u64,
            });
        }
        Ok(hazards)
    }
}

/// WHERE clause and params for an organization + window filter.
fn window_clause(organization_id: &str, window: &ReportingWindow) -> (String, Vec<libsql::Value>) {
    let mut clause = "organization_id = ?1 AND created_at >= ?2".to_string();
    let mut params = vec![
        libsql::Value::Text(organization_id.to_string()),
        libsql::Value::Text(window.since.to_rfc3339()),
    ];
    if let Some(until) = window.until {
        params.push(libsql::Value::Text(until.to_rfc3339()));
        clause.push_str(" AND created_at < ?3");
    }
    (clause, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_request, test_service};
    use attest_core::enums::IntegrityState;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn last_week() -> ReportingWindow {
        ReportingWindow::new(Utc::now() - Duration::days(7), None)
    }

    #[tokio::test]
    async fn summary_over_empty_org() {
        let svc = test_service().await;
        let summary = svc.compliance_summary("org-1", &last_week()).await.unwrap();

        assert_eq!(summary.total_events, 0);
        assert!(summary.by_category.is_empty());
        assert_eq!(summary.ledger_integrity, IntegrityState::NotVerified);
    }

    #[tokio::test]
    async fn summary_counts_by_classification() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        svc.append(&test_request("org-1", "job.updated")).await.unwrap();
        svc.append(&test_request("org-1", "auth.role_violation"))
            .await
            .unwrap();

        let summary = svc.compliance_summary("org-1", &last_week()).await.unwrap();
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.ledger_integrity, IntegrityState::Verified);
        assert_eq!(summary.period_delta, 3);

        let operations = summary
            .by_category
            .iter()
            .find(|c| c.key == "operations")
            .unwrap();
        assert_eq!(operations.count, 2);
        let security = summary
            .by_category
            .iter()
            .find(|c| c.key == "security")
            .unwrap();
        assert_eq!(security.count, 1);

        let blocked = summary
            .by_outcome
            .iter()
            .find(|c| c.key == "blocked")
            .unwrap();
        assert_eq!(blocked.count, 1);
    }

    #[tokio::test]
    async fn top_hazards_group_metadata_reasons() {
        let svc = test_service().await;
        for reason in ["ladder", "ladder", "chemical", "ladder"] {
            let mut req = test_request("org-1", "incident.reported");
            req.metadata = serde_json::json!({ "reason": reason });
            svc.append(&req).await.unwrap();
        }
        let mut no_reason = test_request("org-1", "job.created");
        no_reason.metadata = serde_json::json!({});
        svc.append(&no_reason).await.unwrap();

        let summary = svc.compliance_summary("org-1", &last_week()).await.unwrap();
        assert_eq!(summary.top_hazards.len(), 2);
        assert_eq!(summary.top_hazards[0].reason, "ladder");
        assert_eq!(summary.top_hazards[0].count, 3);
        assert_eq!(summary.top_hazards[1].reason, "chemical");
        assert_eq!(summary.top_hazards[1].count, 1);
    }

    #[tokio::test]
    async fn summary_is_cached_per_window() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();

        let window = last_week();
        let first = svc.compliance_summary("org-1", &window).await.unwrap();
        assert_eq!(svc.cache().len(), 1);

        // A routine append does not invalidate; the cached summary is served.
        svc.append(&test_request("org-1", "job.updated")).await.unwrap();
        let second = svc.compliance_summary("org-1", &window).await.unwrap();
        assert_eq!(second.total_events, first.total_events);
        assert_eq!(second.generated_at, first.generated_at);
    }

    #[tokio::test]
    async fn integrity_error_surfaces_in_summary() {
        let svc = test_service().await;
        let e1 = svc.append(&test_request("org-1", "job.created")).await.unwrap();
        svc.append(&test_request("org-1", "job.updated")).await.unwrap();

        svc.db()
            .conn()
            .execute(
                "UPDATE audit_logs SET metadata = '{\"x\":1}' WHERE id = ?1",
                libsql::params![e1.id.as_str()],
            )
            .await
            .unwrap();

        let summary = svc.compliance_summary("org-1", &last_week()).await.unwrap();
        assert_eq!(summary.ledger_integrity, IntegrityState::Error);
    }
}
