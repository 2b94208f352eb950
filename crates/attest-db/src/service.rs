//! Service layer orchestrating ledger operations.
//!
//! `LedgerService` wraps `LedgerDb` (raw database access), the shared hash
//! salt, the append retry policy, and the reporting cache. All repo methods
//! are implemented as `impl LedgerService`.

use std::time::Duration;

use attest_config::AttestConfig;

use crate::LedgerDb;
use crate::cache::ReportCache;
use crate::error::DatabaseError;
use crate::retry::AppendRetry;

/// Orchestrates appends, verification, and reporting over one ledger database.
///
/// Append is the only mutation; it serializes per organization through the
/// `(organization_id, ledger_seq)` uniqueness constraint plus retry.
/// Verification and reporting are read-only and safe under unbounded
/// concurrency.
pub struct LedgerService {
    db: LedgerDb,
    salt: String,
    verify_depth: u32,
    metadata_budget: usize,
    top_hazard_limit: u32,
    retry: AppendRetry,
    cache: ReportCache,
}

impl LedgerService {
    /// Create a new service wrapping a local database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn new_local(db_path: &str, config: &AttestConfig) -> Result<Self, DatabaseError> {
        let db = LedgerDb::open_local(db_path).await?;
        Ok(Self::from_db(db, config))
    }

    /// Create from an existing `LedgerDb` (for testing).
    #[must_use]
    pub fn from_db(db: LedgerDb, config: &AttestConfig) -> Self {
        let retry = AppendRetry {
            max_attempts: config.ledger.append_attempts,
            ..AppendRetry::default()
        };
        Self {
            db,
            salt: config.ledger.salt.clone(),
            verify_depth: config.ledger.verify_depth,
            metadata_budget: config.ledger.metadata_budget,
            top_hazard_limit: config.reporting.top_hazard_limit,
            retry,
            cache: ReportCache::new(Duration::from_secs(config.reporting.cache_ttl_secs)),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LedgerDb {
        &self.db
    }

    /// The shared hash salt. Crate-private: never exposed in results.
    pub(crate) fn salt(&self) -> &str {
        &self.salt
    }

    /// Single-event verification ancestor depth.
    #[must_use]
    pub const fn verify_depth(&self) -> u32 {
        self.verify_depth
    }

    pub(crate) const fn metadata_budget(&self) -> usize {
        self.metadata_budget
    }

    pub(crate) const fn top_hazard_limit(&self) -> u32 {
        self.top_hazard_limit
    }

    pub(crate) const fn retry(&self) -> &AppendRetry {
        &self.retry
    }

    /// Access the reporting cache.
    #[must_use]
    pub const fn cache(&self) -> &ReportCache {
        &self.cache
    }
}
