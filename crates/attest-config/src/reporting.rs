//! Reporting cache configuration.

use serde::{Deserialize, Serialize};

/// Default cache TTL safety net, in seconds.
const fn default_cache_ttl_secs() -> u64 {
    300
}

/// Default number of hazard drivers in a summary.
const fn default_top_hazard_limit() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportingConfig {
    /// TTL fallback for cached summaries. Explicit invalidation on material
    /// appends is the primary policy; the TTL catches everything else.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How many top hazard drivers to include in a compliance summary.
    #[serde(default = "default_top_hazard_limit")]
    pub top_hazard_limit: u32,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            top_hazard_limit: default_top_hazard_limit(),
        }
    }
}
