//! # tandem-db
//!
//! libSQL persistence and the decision service orchestrator for Tandem.
//!
//! Handles all relational state for the decision center: decision records,
//! the append-only version ledger, and detected conflicts. `TandemDb` is the
//! raw database handle; `DecisionService` (see [`service`]) sequences every
//! mutation as validate → lock gate → version check → transaction, with
//! conflict scanning and event publication as post-commit side effects.

pub mod detector;
pub mod error;
pub mod events;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

use error::StoreError;
use libsql::Builder;

/// Central database handle for decision center state.
///
/// Wraps a libSQL database and connection; provides ID generation and
/// transaction scoping. Repo read methods live in [`repos`].
pub struct TandemDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl TandemDb {
    /// Open a local-only database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tandem_db = Self { db, conn };
        tandem_db.run_migrations().await?;
        Ok(tandem_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Begin a transaction — the unit of work for every mutating operation.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the transaction cannot be started.
    pub async fn begin(&self) -> Result<libsql::Transaction, StoreError> {
        Ok(self.conn.transaction().await?)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"decision-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, StoreError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> TandemDb {
        TandemDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = ["decisions", "decision_versions", "decision_conflicts"];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn open_conflict_index_is_partial_unique() {
        let db = test_db().await;

        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='index' AND name='decision_conflicts_one_open'",
                (),
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("decision").await.unwrap();
        assert!(
            id.starts_with("decision-"),
            "ID should start with 'decision-': {id}"
        );

        let hex_part = id.strip_prefix("decision-").unwrap();
        assert_eq!(hex_part.len(), 8, "random part should be 8 hex chars: {id}");
        assert!(
            hex_part.chars().all(|c| c.is_ascii_hexdigit()),
            "Random part should be hex: {hex_part}"
        );
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in tandem_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("decision").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again — should not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_version_rejected_by_primary_key() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO decisions (id, chat_id, title, value, created_by, created_at, updated_at)
                 VALUES ('decision-t1', 'chat-1', 'T', '{}', 'usr-a', datetime('now'), datetime('now'))",
                (),
            )
            .await
            .unwrap();

        db.conn()
            .execute(
                "INSERT INTO decision_versions (decision_id, version_number, value, changed_by)
                 VALUES ('decision-t1', 1, '{}', 'usr-a')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO decision_versions (decision_id, version_number, value, changed_by)
                 VALUES ('decision-t1', 1, '{}', 'usr-b')",
                (),
            )
            .await;
        assert!(result.is_err(), "duplicate (decision, version) should be rejected");
    }

    #[tokio::test]
    async fn second_open_conflict_rejected_by_partial_index() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO decisions (id, chat_id, title, value, created_by, created_at, updated_at)
                 VALUES ('decision-t2', 'chat-1', 'T', '{}', 'usr-a', datetime('now'), datetime('now'))",
                (),
            )
            .await
            .unwrap();

        db.conn()
            .execute(
                "INSERT INTO decision_conflicts (id, decision_id, conflict_type, description, status, detected_at)
                 VALUES ('conflict-1', 'decision-t2', 'value_mismatch', 'd', 'open', datetime('now'))",
                (),
            )
            .await
            .unwrap();

        let second_open = db
            .conn()
            .execute(
                "INSERT INTO decision_conflicts (id, decision_id, conflict_type, description, status, detected_at)
                 VALUES ('conflict-2', 'decision-t2', 'value_mismatch', 'd', 'open', datetime('now'))",
                (),
            )
            .await;
        assert!(second_open.is_err(), "second open conflict of same type should be rejected");

        // A resolved row does not participate in the partial index
        db.conn()
            .execute(
                "UPDATE decision_conflicts SET status = 'resolved' WHERE id = 'conflict-1'",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO decision_conflicts (id, decision_id, conflict_type, description, status, detected_at)
                 VALUES ('conflict-3', 'decision-t2', 'value_mismatch', 'd', 'open', datetime('now'))",
                (),
            )
            .await
            .unwrap();
    }
}
