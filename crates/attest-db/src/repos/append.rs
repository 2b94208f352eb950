//! Hash-chain append engine.
//!
//! Append is the ledger's only mutation. Per organization it is a
//! read-modify-write on the chain head: read the highest `ledger_seq`,
//! compute the new hash, INSERT. Concurrent writers racing on the same
//! organization collide on the `(organization_id, ledger_seq)` uniqueness
//! constraint; the loser re-reads the head and retries with backoff.
//!
//! Callers recording business events use [`LedgerService::record`], which
//! treats a ledger-write failure as non-fatal: log and continue. The
//! business action is never rolled back on account of the ledger, so gaps
//! are a possible, detectable failure mode: verification reports them, it
//! never heals them.

use attest_core::canonical::{EventContent, chain_hash};
use attest_core::classify::{classify, is_material};
use attest_core::entities::LedgerEvent;
use attest_core::{ids, metadata};
use chrono::Utc;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::retry::is_sequence_conflict;
use crate::service::LedgerService;

/// Input for one append. Classification and hashing are derived inside the
/// engine; producers only describe what happened.
#[derive(Debug, Clone)]
pub struct AppendRequest {
    pub organization_id: String,
    pub actor_id: Option<String>,
    pub event_name: String,
    pub target_type: String,
    pub target_id: Option<String>,
    pub metadata: serde_json::Value,
}

impl LedgerService {
    /// Append one event to an organization's chain.
    ///
    /// Reads the chain head, assigns `ledger_seq = head + 1` (base 1),
    /// links `prev_hash`, computes the chain hash, and persists the row.
    /// Retries on sequence conflicts up to the configured attempt cap.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::SequenceConflict` when the retry budget is
    /// exhausted, or `DatabaseError` for any other persistence failure. No
    /// event is fabricated on failure.
    pub async fn append(&self, req: &AppendRequest) -> Result<LedgerEvent, DatabaseError> {
        let doc = if req.metadata.is_null() {
            serde_json::json!({})
        } else {
            req.metadata.clone()
        };
        let metadata_text = serde_json::to_string(&doc)
            .map_err(|e| DatabaseError::Query(format!("metadata serialization: {e}")))?;
        let class = classify(&req.event_name);

        let max_attempts = self.retry().max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let head = self.chain_head(&req.organization_id).await?;
            let (new_seq, prev_hash) = match &head {
                Some((seq, hash)) => (seq + 1, hash.clone()),
                None => (1, String::new()),
            };

            let created_at = Utc::now();
            let created_at_text = created_at.to_rfc3339();
            let content = EventContent {
                seq: new_seq,
                org_id: &req.organization_id,
                actor_id: req.actor_id.as_deref(),
                event_name: &req.event_name,
                target_type: &req.target_type,
                target_id: req.target_id.as_deref(),
                created_at: &created_at_text,
                metadata: &doc,
            };
            let hash = chain_hash(&content, &prev_hash, self.salt());
            let id = self.db().generate_id(ids::EVENT).await?;

            let result = self
                .db()
                .execute_with(
                    "INSERT INTO audit_logs (id, organization_id, ledger_seq, actor_id, event_name, \
                     target_type, target_id, metadata, created_at, prev_hash, hash, severity, category, outcome)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    || {
                        libsql::params![
                            id.as_str(),
                            req.organization_id.as_str(),
                            new_seq,
                            req.actor_id.as_deref(),
                            req.event_name.as_str(),
                            req.target_type.as_str(),
                            req.target_id.as_deref(),
                            metadata_text.as_str(),
                            created_at_text.as_str(),
                            prev_hash.as_str(),
                            hash.as_str(),
                            class.severity.as_str(),
                            class.category.as_str(),
                            class.outcome.as_str()
                        ]
                    },
                )
                .await;

            match result {
                Ok(_) => {
                    if is_material(&req.event_name, class.category) {
                        self.cache().invalidate_org(&req.organization_id);
                    }
                    // Re-parse created_at from the stored text so the struct
                    // matches what verification will read back.
                    return Ok(LedgerEvent {
                        id,
                        organization_id: req.organization_id.clone(),
                        ledger_seq: new_seq,
                        actor_id: req.actor_id.clone().filter(|a| !a.is_empty()),
                        event_name: req.event_name.clone(),
                        target_type: req.target_type.clone(),
                        target_id: req.target_id.clone().filter(|t| !t.is_empty()),
                        metadata: doc,
                        created_at: parse_datetime(&created_at_text)?,
                        prev_hash,
                        hash,
                        severity: class.severity,
                        category: class.category,
                        outcome: class.outcome,
                    });
                }
                Err(DatabaseError::LibSql(e)) if is_sequence_conflict(&e) => {
                    if attempt == max_attempts {
                        break;
                    }
                    tracing::debug!(
                        organization_id = req.organization_id.as_str(),
                        attempt,
                        "append lost sequence race, retrying with fresh head"
                    );
                    tokio::time::sleep(self.retry().backoff(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(DatabaseError::SequenceConflict {
            organization_id: req.organization_id.clone(),
            attempts: max_attempts,
        })
    }

    /// Record a business event, swallowing ledger failures.
    ///
    /// Applies the metadata byte budget before hashing, then appends. On
    /// failure the error is logged and `None` returned; producers continue
    /// their primary operation regardless.
    pub async fn record(
        &self,
        organization_id: &str,
        actor_id: Option<&str>,
        event_name: &str,
        target_type: &str,
        target_id: Option<&str>,
        metadata: serde_json::Value,
    ) -> Option<LedgerEvent> {
        let req = AppendRequest {
            organization_id: organization_id.to_string(),
            actor_id: actor_id.map(str::to_string),
            event_name: event_name.to_string(),
            target_type: target_type.to_string(),
            target_id: target_id.map(str::to_string),
            metadata: metadata::prepare(metadata, self.metadata_budget()),
        };
        match self.append(&req).await {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(
                    organization_id,
                    event_name,
                    error = %e,
                    "ledger append failed; continuing without audit entry"
                );
                None
            }
        }
    }

    /// Read the organization's chain head: `(ledger_seq, hash)` of the
    /// highest-sequence event, or `None` for an empty chain.
    pub(crate) async fn chain_head(
        &self,
        organization_id: &str,
    ) -> Result<Option<(i64, String)>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT ledger_seq, hash FROM audit_logs
                 WHERE organization_id = ?1
                 ORDER BY ledger_seq DESC LIMIT 1",
                || libsql::params![organization_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some((row.get::<i64>(0)?, row.get::<String>(1)?))),
            None => Ok(None),
        }
    }
}
