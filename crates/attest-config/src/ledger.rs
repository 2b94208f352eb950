//! Ledger hash-chain configuration.

use serde::{Deserialize, Serialize};

/// Default ancestor-link depth for single-event verification.
const fn default_verify_depth() -> u32 {
    10
}

/// Default metadata byte budget (compact-serialized form).
const fn default_metadata_budget() -> usize {
    8 * 1024
}

/// Default append attempts before a sequence conflict is surfaced.
const fn default_append_attempts() -> u32 {
    4
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Shared secret salt mixed into every chain hash. Required for
    /// production use; an empty salt still hashes but offers no secrecy.
    #[serde(default)]
    pub salt: String,

    /// How many ancestor links a single-event spot check walks. The
    /// immediate predecessor is always resolved, so values below 1 behave
    /// as 1. Organization-wide verification always replays the full chain.
    #[serde(default = "default_verify_depth")]
    pub verify_depth: u32,

    /// Metadata byte budget applied before encoding (and therefore before
    /// hashing). Oversized documents are replaced by `{"truncated": true}`.
    #[serde(default = "default_metadata_budget")]
    pub metadata_budget: usize,

    /// Maximum append attempts when racing writers collide on
    /// `(organization_id, ledger_seq)`.
    #[serde(default = "default_append_attempts")]
    pub append_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            salt: String::new(),
            verify_depth: default_verify_depth(),
            metadata_budget: default_metadata_budget(),
            append_attempts: default_append_attempts(),
        }
    }
}

impl LedgerConfig {
    /// Whether the ledger has the minimum required fields for production.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.salt.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = LedgerConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.verify_depth, 10);
        assert_eq!(config.metadata_budget, 8 * 1024);
        assert_eq!(config.append_attempts, 4);
    }

    #[test]
    fn configured_when_salt_set() {
        let config = LedgerConfig {
            salt: "s3cret".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
