//! Metadata byte budget.
//!
//! Producers may pass arbitrarily large metadata documents. The budget is
//! applied *before* encoding so the truncation outcome is deterministic and
//! is what gets hashed. Append itself never rejects on metadata size.

use serde_json::{Value, json};

/// Default metadata budget in bytes (compact-serialized form).
pub const DEFAULT_METADATA_BUDGET: usize = 8 * 1024;

/// The marker document substituted for an over-budget payload.
#[must_use]
pub fn truncation_marker() -> Value {
    json!({ "truncated": true })
}

/// Normalize and budget a metadata document.
///
/// - `null` becomes the empty document (the encoder never hashes `null`)
/// - a document whose compact serialization exceeds `budget` bytes is
///   replaced by the truncation marker
/// - if serialization itself fails, the marker is substituted as well
#[must_use]
pub fn prepare(metadata: Value, budget: usize) -> Value {
    if metadata.is_null() {
        return json!({});
    }
    match serde_json::to_string(&metadata) {
        Ok(s) if s.len() <= budget => metadata,
        _ => truncation_marker(),
    }
}
