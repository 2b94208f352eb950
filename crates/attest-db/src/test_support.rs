//! Shared test utilities for attest-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use attest_config::AttestConfig;

    use crate::LedgerDb;
    use crate::repos::AppendRequest;
    use crate::service::LedgerService;

    fn test_config() -> AttestConfig {
        let mut config = AttestConfig::default();
        config.ledger.salt = "test-salt".into();
        // Enough headroom for every racer in the concurrency tests to lose
        // all but its final head read.
        config.ledger.append_attempts = 16;
        config
    }

    /// Create an in-memory `LedgerService` with the standard test salt.
    pub async fn test_service() -> LedgerService {
        let db = LedgerDb::open_local(":memory:").await.unwrap();
        LedgerService::from_db(db, &test_config())
    }

    /// Create an in-memory service with a custom single-event verify depth.
    pub async fn test_service_with_depth(verify_depth: u32) -> LedgerService {
        let db = LedgerDb::open_local(":memory:").await.unwrap();
        let mut config = test_config();
        config.ledger.verify_depth = verify_depth;
        LedgerService::from_db(db, &config)
    }

    /// A minimal append request for tests; override fields as needed.
    pub fn test_request(organization_id: &str, event_name: &str) -> AppendRequest {
        AppendRequest {
            organization_id: organization_id.to_string(),
            actor_id: Some("usr-1".to_string()),
            event_name: event_name.to_string(),
            target_type: "job".to_string(),
            target_id: Some("job-9".to_string()),
            metadata: serde_json::json!({}),
        }
    }
}
