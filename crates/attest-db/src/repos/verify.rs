//! Chain verification.
//!
//! Two read-only checks built on the same canonical pipeline as append:
//!
//! - [`LedgerService::verify_event`]: fast spot check of one event,
//!   recomputing its hash and resolving a bounded number of ancestor links.
//! - [`LedgerService::verify_chain`]: full O(n) replay of an
//!   organization's chain, first failure wins. Intentionally simple and
//!   auditable rather than incremental.
//!
//! Verification never mutates ledger rows and is safe under unbounded
//! concurrency. A broken chain is reported, never repaired.

use attest_core::canonical::chain_hash;
use attest_core::entities::{ChainFailure, ChainIntegrityStatus, VerificationResult};
use attest_core::enums::IntegrityState;
use chrono::Utc;

use crate::error::DatabaseError;
use crate::service::LedgerService;

impl LedgerService {
    /// Spot-check one event: recompute its hash from stored fields and
    /// resolve up to `verify_depth` ancestor links.
    ///
    /// The immediate predecessor link is always resolved; `verify_depth`
    /// bounds only the walk beyond it, so a depth of zero behaves as one.
    /// `prev_hash_valid` is false when any walked link fails to resolve.
    /// `ancestors_checked` counts the links that did resolve; this is a
    /// partial check, not a walk to genesis.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the event does not exist.
    pub async fn verify_event(
        &self,
        organization_id: &str,
        event_id: &str,
    ) -> Result<VerificationResult, DatabaseError> {
        let event = self.get_event(organization_id, event_id).await?;

        let created_at = event.created_at_rfc3339();
        let computed_hash = chain_hash(&event.content(&created_at), &event.prev_hash, self.salt());

        let mut prev_hash_valid = true;
        let mut ancestors_checked = 0u32;
        let mut cursor = event.prev_hash.clone();
        // The predecessor check is mandatory; the depth cap only bounds the
        // deeper walk.
        let depth = self.verify_depth().max(1);
        while !cursor.is_empty() && ancestors_checked < depth {
            match self.get_event_by_hash(organization_id, &cursor).await? {
                Some(ancestor) => {
                    ancestors_checked += 1;
                    cursor = ancestor.prev_hash;
                }
                None => {
                    prev_hash_valid = false;
                    break;
                }
            }
        }

        Ok(VerificationResult {
            event_id: event.id,
            hash_matches: event.hash == computed_hash,
            stored_hash: event.hash,
            computed_hash,
            prev_hash_valid,
            ancestors_checked,
            verified_at: Utc::now(),
        })
    }

    /// Replay an organization's full chain in sequence order.
    ///
    /// For each event: the link to its predecessor must hold
    /// (`curr.prev_hash == prev.hash`, empty only at position zero) and its
    /// stored hash must equal the recomputed canonical hash. The walk stops
    /// at the first failure and reports it with structured detail.
    ///
    /// Zero events is `not_verified`: a valid resting state, not an error.
    pub async fn verify_chain(
        &self,
        organization_id: &str,
    ) -> Result<ChainIntegrityStatus, DatabaseError> {
        let events = self.chain_events(organization_id).await?;
        if events.is_empty() {
            return Ok(ChainIntegrityStatus::not_verified(organization_id));
        }

        let mut prev_hash: Option<&str> = None;
        for (index, event) in events.iter().enumerate() {
            let failure = match prev_hash {
                None if !event.prev_hash.is_empty() => Some(ChainFailure {
                    event_id: event.id.clone(),
                    index: index as u64,
                    expected_hash: String::new(),
                    actual_hash: event.prev_hash.clone(),
                    reason: "first event carries a prev_hash; its predecessor is missing".into(),
                }),
                Some(expected) if event.prev_hash.is_empty() => Some(ChainFailure {
                    event_id: event.id.clone(),
                    index: index as u64,
                    expected_hash: expected.to_string(),
                    actual_hash: String::new(),
                    reason: "missing prev_hash on a non-first event".into(),
                }),
                Some(expected) if event.prev_hash != expected => Some(ChainFailure {
                    event_id: event.id.clone(),
                    index: index as u64,
                    expected_hash: expected.to_string(),
                    actual_hash: event.prev_hash.clone(),
                    reason: "prev_hash does not match predecessor hash".into(),
                }),
                _ => {
                    let created_at = event.created_at_rfc3339();
                    let computed =
                        chain_hash(&event.content(&created_at), &event.prev_hash, self.salt());
                    if computed == event.hash {
                        None
                    } else {
                        Some(ChainFailure {
                            event_id: event.id.clone(),
                            index: index as u64,
                            expected_hash: computed,
                            actual_hash: event.hash.clone(),
                            reason: "stored hash does not match recomputed canonical hash".into(),
                        })
                    }
                }
            };

            if let Some(failure) = failure {
                return Ok(ChainIntegrityStatus {
                    organization_id: organization_id.to_string(),
                    status: IntegrityState::Error,
                    events_checked: index as u64 + 1,
                    verified_through_event_id: None,
                    failure: Some(failure),
                    checked_at: Utc::now(),
                });
            }
            prev_hash = Some(&event.hash);
        }

        Ok(ChainIntegrityStatus {
            organization_id: organization_id.to_string(),
            status: IntegrityState::Verified,
            events_checked: events.len() as u64,
            verified_through_event_id: events.last().map(|e| e.id.clone()),
            failure: None,
            checked_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_request, test_service, test_service_with_depth};
    use pretty_assertions::assert_eq;

    async fn tamper(svc: &LedgerService, sql: &str, params: Vec<libsql::Value>) {
        svc.db()
            .conn()
            .execute(sql, libsql::params_from_iter(params))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_chain_is_not_verified() {
        let svc = test_service().await;
        let status = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(status.status, IntegrityState::NotVerified);
        assert_eq!(status.events_checked, 0);
        assert!(status.failure.is_none());
    }

    #[tokio::test]
    async fn fresh_chain_verifies_through_last_event() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        svc.append(&test_request("org-1", "job.updated")).await.unwrap();
        let e3 = svc
            .append(&test_request("org-1", "auth.role_violation"))
            .await
            .unwrap();

        let status = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(status.status, IntegrityState::Verified);
        assert_eq!(status.events_checked, 3);
        assert_eq!(status.verified_through_event_id, Some(e3.id));
    }

    #[tokio::test]
    async fn verify_event_passes_on_untouched_event() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        svc.append(&test_request("org-1", "job.updated")).await.unwrap();
        let e3 = svc.append(&test_request("org-1", "job.completed")).await.unwrap();

        let result = svc.verify_event("org-1", &e3.id).await.unwrap();
        assert!(result.hash_matches);
        assert!(result.prev_hash_valid);
        assert_eq!(result.ancestors_checked, 2);
        assert_eq!(result.stored_hash, result.computed_hash);
    }

    #[tokio::test]
    async fn verify_event_depth_caps_ancestor_walk() {
        let svc = test_service_with_depth(1).await;
        for name in ["job.created", "job.updated", "job.completed"] {
            svc.append(&test_request("org-1", name)).await.unwrap();
        }
        let chain = svc.chain_events("org-1").await.unwrap();
        let last = chain.last().unwrap();

        let result = svc.verify_event("org-1", &last.id).await.unwrap();
        assert!(result.prev_hash_valid);
        assert_eq!(result.ancestors_checked, 1);
    }

    #[tokio::test]
    async fn depth_zero_still_resolves_immediate_predecessor() {
        let svc = test_service_with_depth(0).await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        let e2 = svc.append(&test_request("org-1", "job.updated")).await.unwrap();

        tamper(
            &svc,
            "UPDATE audit_logs SET prev_hash = 'deadbeef' WHERE id = ?1",
            vec![libsql::Value::Text(e2.id.clone())],
        )
        .await;

        let result = svc.verify_event("org-1", &e2.id).await.unwrap();
        assert!(
            !result.prev_hash_valid,
            "a dangling prev_hash must never be reported valid"
        );
        assert_eq!(result.ancestors_checked, 0);
    }

    #[tokio::test]
    async fn content_tamper_is_detected_by_both_verifiers() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        let e2 = svc.append(&test_request("org-1", "job.updated")).await.unwrap();
        svc.append(&test_request("org-1", "auth.role_violation"))
            .await
            .unwrap();

        // Overwrite E2's event_name in the store without recomputing its hash.
        tamper(
            &svc,
            "UPDATE audit_logs SET event_name = 'job.updated_TAMPERED' WHERE id = ?1",
            vec![libsql::Value::Text(e2.id.clone())],
        )
        .await;

        let spot = svc.verify_event("org-1", &e2.id).await.unwrap();
        assert!(!spot.hash_matches);
        assert_ne!(spot.stored_hash, spot.computed_hash);

        let status = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(status.status, IntegrityState::Error);
        let failure = status.failure.unwrap();
        assert_eq!(failure.event_id, e2.id);
        assert_eq!(failure.index, 1);
        assert_ne!(failure.expected_hash, failure.actual_hash);
    }

    #[tokio::test]
    async fn broken_link_reports_expected_and_actual() {
        let svc = test_service().await;
        let e1 = svc.append(&test_request("org-1", "job.created")).await.unwrap();
        let e2 = svc.append(&test_request("org-1", "job.updated")).await.unwrap();

        tamper(
            &svc,
            "UPDATE audit_logs SET prev_hash = 'deadbeef' WHERE id = ?1",
            vec![libsql::Value::Text(e2.id.clone())],
        )
        .await;

        let status = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(status.status, IntegrityState::Error);
        let failure = status.failure.unwrap();
        assert_eq!(failure.event_id, e2.id);
        assert_eq!(failure.expected_hash, e1.hash);
        assert_eq!(failure.actual_hash, "deadbeef");

        // The spot check also sees the dangling link.
        let spot = svc.verify_event("org-1", &e2.id).await.unwrap();
        assert!(!spot.prev_hash_valid);
    }

    #[tokio::test]
    async fn missing_prev_hash_mid_chain_is_an_error() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();
        let e2 = svc.append(&test_request("org-1", "job.updated")).await.unwrap();

        tamper(
            &svc,
            "UPDATE audit_logs SET prev_hash = '' WHERE id = ?1",
            vec![libsql::Value::Text(e2.id.clone())],
        )
        .await;

        let status = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(status.status, IntegrityState::Error);
        let failure = status.failure.unwrap();
        assert_eq!(failure.event_id, e2.id);
        assert_eq!(failure.actual_hash, "");
    }

    #[tokio::test]
    async fn verification_is_repeatable() {
        let svc = test_service().await;
        svc.append(&test_request("org-1", "job.created")).await.unwrap();

        let first = svc.verify_chain("org-1").await.unwrap();
        let second = svc.verify_chain("org-1").await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(
            first.verified_through_event_id,
            second.verified_through_event_id
        );
    }
}
