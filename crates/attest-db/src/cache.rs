//! In-process reporting cache.
//!
//! Memoizes compliance summaries per `(organization, window)`. The primary
//! invalidation policy is explicit: appending a *material* event drops every
//! cached window for that organization. The TTL is a safety net, not the
//! policy.
//!
//! This cache lives for the process lifetime. Horizontal scaling needs a
//! shared keyed store instead (see DESIGN.md).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use attest_core::entities::{ComplianceSummary, ReportingWindow};

struct CacheEntry {
    summary: ComplianceSummary,
    stored_at: Instant,
}

/// Keyed summary cache with explicit per-organization invalidation.
pub struct ReportCache {
    entries: Mutex<HashMap<(String, ReportingWindow), CacheEntry>>,
    ttl: Duration,
}

impl ReportCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Fetch a cached summary if present and within TTL.
    #[must_use]
    pub fn get(&self, organization_id: &str, window: &ReportingWindow) -> Option<ComplianceSummary> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(&(organization_id.to_string(), window.clone()))?;
        if entry.stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.summary.clone())
    }

    /// Store a freshly computed summary.
    pub fn put(&self, summary: ComplianceSummary) {
        if let Ok(mut entries) = self.entries.lock() {
            let key = (summary.organization_id.clone(), summary.window.clone());
            entries.insert(
                key,
                CacheEntry {
                    summary,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every cached window for one organization. Called on material
    /// appends.
    pub fn invalidate_org(&self, organization_id: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|(org, _), _| org != organization_id);
        }
    }

    /// Number of live entries (for tests).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
