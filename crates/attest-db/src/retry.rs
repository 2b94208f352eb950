//! Append sequence-conflict retry policy.
//!
//! Concurrent appends for the same organization race on the
//! `(organization_id, ledger_seq)` uniqueness constraint. The losing
//! writer's INSERT fails; it re-reads the chain head and tries again with
//! exponential backoff. The predicate is intentionally narrow so genuine
//! SQL errors are never retried.

use std::time::Duration;

/// Configuration for append retry behavior.
#[derive(Debug, Clone)]
pub struct AppendRetry {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for AppendRetry {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl AppendRetry {
    /// Backoff before retry number `attempt` (1-based), doubling each time
    /// and capped at `max_delay`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect a losing racer: the INSERT violated the per-organization sequence
/// uniqueness constraint.
#[must_use]
pub fn is_sequence_conflict(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("UNIQUE constraint failed") && msg.contains("ledger_seq")
}
