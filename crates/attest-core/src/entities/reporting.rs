use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::IntegrityState;

/// Half-open reporting window `[since, until)`. `until = None` means "now".
///
/// Also the reporting-cache key component, hence `Hash`/`Eq`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct ReportingWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl ReportingWindow {
    #[must_use]
    pub const fn new(since: DateTime<Utc>, until: Option<DateTime<Utc>>) -> Self {
        Self { since, until }
    }

    /// The window of equal length immediately preceding this one, for
    /// period-over-period deltas.
    #[must_use]
    pub fn previous(&self, now: DateTime<Utc>) -> Self {
        let until = self.until.unwrap_or(now);
        let span = until - self.since;
        Self {
            since: self.since - span,
            until: Some(self.since),
        }
    }
}

/// Count of events sharing one classification value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// A hazard driver: a metadata `reason` code and how often it occurred.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HazardDriver {
    pub reason: String,
    pub count: u64,
}

/// Executive compliance summary for one organization and window.
///
/// Aggregates run over unverified event sets; `ledger_integrity` is the
/// trust signal surfaced alongside the numbers, not a gate on computing
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComplianceSummary {
    pub organization_id: String,
    pub window: ReportingWindow,
    pub total_events: u64,
    pub by_category: Vec<GroupCount>,
    pub by_severity: Vec<GroupCount>,
    pub by_outcome: Vec<GroupCount>,
    pub top_hazards: Vec<HazardDriver>,
    pub previous_period_total: u64,
    /// `total_events - previous_period_total`.
    pub period_delta: i64,
    pub ledger_integrity: IntegrityState,
    pub generated_at: DateTime<Utc>,
}
