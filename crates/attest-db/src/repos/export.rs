//! JSONL chain export.
//!
//! Dumps an organization's full chain, sequence-ascending, one event per
//! line. The export carries `prev_hash`/`hash`, so an offline auditor can
//! replay the chain without database access.

use std::path::Path;

use crate::error::DatabaseError;
use crate::service::LedgerService;

impl LedgerService {
    /// Export an organization's chain to a JSONL file, overwriting any
    /// existing file. Returns the number of events written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the chain query or the file write fails.
    pub async fn export_chain(
        &self,
        organization_id: &str,
        path: &Path,
    ) -> Result<u32, DatabaseError> {
        let events = self.chain_events(organization_id).await?;
        serde_jsonlines::write_json_lines(path, &events)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        Ok(events.len() as u32)
    }
}
