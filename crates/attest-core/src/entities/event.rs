use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::canonical::EventContent;
use crate::enums::{Category, Outcome, Severity};

/// One append-only audit ledger entry.
///
/// Immutable post-creation. `ledger_seq` is strictly increasing per
/// organization starting at 1; `prev_hash` is the predecessor's `hash`, or
/// the empty string for the first event of an organization's chain.
/// Classification fields (`severity`, `category`, `outcome`) are derived at
/// append time for reporting and are not hash inputs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LedgerEvent {
    pub id: String,
    pub organization_id: String,
    pub ledger_seq: i64,
    pub actor_id: Option<String>,
    pub event_name: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub prev_hash: String,
    pub hash: String,
    pub severity: Severity,
    pub category: Category,
    pub outcome: Outcome,
}

impl LedgerEvent {
    /// The hashable view of this event, with `created_at` rendered in the
    /// same RFC 3339 form that append stored.
    ///
    /// The returned `created_at` string is owned by the caller; pass it in
    /// to keep `EventContent` borrowed.
    #[must_use]
    pub fn content<'a>(&'a self, created_at: &'a str) -> EventContent<'a> {
        EventContent {
            seq: self.ledger_seq,
            org_id: &self.organization_id,
            actor_id: self.actor_id.as_deref(),
            event_name: &self.event_name,
            target_type: &self.target_type,
            target_id: self.target_id.as_deref(),
            created_at,
            metadata: &self.metadata,
        }
    }

    /// RFC 3339 form of `created_at`, the exact string used as a hash input.
    #[must_use]
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339()
    }
}
