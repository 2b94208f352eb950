//! # attest-db
//!
//! libSQL persistence for the Attest audit ledger.
//!
//! Owns the append-only `audit_logs` table, the hash-chain append engine,
//! single-event and organization-wide verification, and the derived
//! compliance reporting built on top. Uses the `libsql` crate (C `SQLite`
//! fork) with embedded migrations.

pub mod cache;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;

mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;

/// Central database handle for ledger storage.
///
/// Wraps a libSQL database and connection. Provides ID generation and the
/// query primitives the repos build on.
pub struct LedgerDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LedgerDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let ledger_db = Self { db, conn };
        ledger_db.run_migrations().await?;
        Ok(ledger_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a statement, rebuilding params via the closure.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails.
    pub async fn execute_with<P, F>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        Ok(self.conn.execute(sql, params()).await?)
    }

    /// Run a query, rebuilding params via the closure.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_with<P, F>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        P: IntoParams,
        F: Fn() -> P,
    {
        Ok(self.conn.query(sql, params()).await?)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"evt-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> LedgerDb {
        LedgerDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='audit_logs'",
                (),
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some(), "audit_logs should exist");
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("evt").await.unwrap();
        assert!(id.starts_with("evt-"), "ID should start with 'evt-': {id}");
        assert_eq!(
            id.len(),
            12,
            "ID should be 12 chars (3 prefix + 1 dash + 8 hex): {id}"
        );

        let hex_part = &id[4..];
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in attest_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("evt").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn org_seq_uniqueness_enforced() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO audit_logs (id, organization_id, ledger_seq, event_name, target_type, created_at, hash, severity, category, outcome)
                 VALUES ('evt-1', 'org-1', 1, 'job.created', 'job', '2026-08-26T12:00:00+00:00', 'h1', 'info', 'operations', 'success')",
                (),
            )
            .await
            .unwrap();

        // Second writer claiming the same (org, seq) must be rejected.
        let result = db
            .conn()
            .execute(
                "INSERT INTO audit_logs (id, organization_id, ledger_seq, event_name, target_type, created_at, hash, severity, category, outcome)
                 VALUES ('evt-2', 'org-1', 1, 'job.updated', 'job', '2026-08-26T12:00:01+00:00', 'h2', 'info', 'operations', 'success')",
                (),
            )
            .await;
        assert!(result.is_err(), "duplicate (org, seq) should be rejected");

        // Same seq in a different organization is fine.
        db.conn()
            .execute(
                "INSERT INTO audit_logs (id, organization_id, ledger_seq, event_name, target_type, created_at, hash, severity, category, outcome)
                 VALUES ('evt-3', 'org-2', 1, 'job.created', 'job', '2026-08-26T12:00:02+00:00', 'h3', 'info', 'operations', 'success')",
                (),
            )
            .await
            .unwrap();
    }
}
