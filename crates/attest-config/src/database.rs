//! Database configuration.

use serde::{Deserialize, Serialize};

/// Default database path: in-memory, suitable for tests and dry runs.
fn default_path() -> String {
    ":memory:".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `":memory:"`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether a durable (non-memory) database path is configured.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.path != ":memory:" && !self.path.is_empty()
    }
}
