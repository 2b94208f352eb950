use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::IntegrityState;

/// Result of a single-event spot check.
///
/// Read-only: verification never mutates the event. `ancestors_checked` is
/// how many `prev_hash` links were actually resolved, bounded by the
/// configured depth; this is a partial check, not a walk to genesis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct VerificationResult {
    pub event_id: String,
    pub stored_hash: String,
    pub computed_hash: String,
    pub hash_matches: bool,
    pub prev_hash_valid: bool,
    pub ancestors_checked: u32,
    pub verified_at: DateTime<Utc>,
}

/// Structured detail for the first broken link found by a chain walk.
///
/// `expected_hash` is the predecessor's stored hash; `actual_hash` is the
/// failing event's `prev_hash` (or its recomputed hash on a content
/// mismatch). The secret salt is never part of this report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChainFailure {
    pub event_id: String,
    pub index: u64,
    pub expected_hash: String,
    pub actual_hash: String,
    pub reason: String,
}

/// Outcome of an organization-wide chain replay.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ChainIntegrityStatus {
    pub organization_id: String,
    pub status: IntegrityState,
    pub events_checked: u64,
    /// Set when `status` is `verified`: the last event the walk covered.
    pub verified_through_event_id: Option<String>,
    /// Set when `status` is `error`: the first broken link found.
    pub failure: Option<ChainFailure>,
    pub checked_at: DateTime<Utc>,
}

impl ChainIntegrityStatus {
    /// An empty-chain status: nothing to verify is a valid resting state.
    #[must_use]
    pub fn not_verified(organization_id: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            status: IntegrityState::NotVerified,
            events_checked: 0,
            verified_through_event_id: None,
            failure: None,
            checked_at: Utc::now(),
        }
    }
}
