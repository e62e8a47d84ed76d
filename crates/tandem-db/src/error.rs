//! Storage error types for tandem-db.
//!
//! `StoreError` covers storage-level failures only. The caller-facing
//! taxonomy lives in `tandem_core::errors::DecisionError`; storage failures
//! converge into its `Storage` variant via the `From` impl below.

use tandem_core::errors::DecisionError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for DecisionError {
    fn from(err: StoreError) -> Self {
        Self::Storage(anyhow::Error::new(err))
    }
}
