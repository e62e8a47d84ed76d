//! Caller-facing error taxonomy for Tandem.
//!
//! Every variant here is an expected, recoverable-by-caller condition and
//! propagates unchanged from `DecisionService` with its distinguishing data
//! intact. The compatibility layer maps kinds to transport status signaling
//! ("locked" vs "not found" vs "version conflict" must stay distinguishable
//! all the way to the boundary). Storage-level failures converge into
//! `Storage` and roll back the whole operation.

use thiserror::Error;

/// Errors raised by decision operations.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// Input failed a shape rule (question/decisionType/options, empty patch).
    #[error("Validation failed for {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Decision, conflict, or version-history lookup returned no result.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A field mutation was blocked by another actor's advisory lock.
    #[error("Decision {decision_id} is locked by {locked_by}")]
    Locked {
        decision_id: String,
        locked_by: String,
    },

    /// A lock request was blocked by another actor's advisory lock.
    ///
    /// Distinguished from [`DecisionError::Locked`]: this arises from an
    /// explicit lock request and maps to a "resource locked" condition at
    /// the boundary, not a generic conflict.
    #[error("Decision {decision_id} is already locked by {locked_by}")]
    AlreadyLocked {
        decision_id: String,
        locked_by: String,
    },

    /// Optimistic version check failed. Carries both version numbers so the
    /// caller can refresh and retry.
    #[error("Version conflict on decision {decision_id}: expected {expected}, actual {actual}")]
    VersionConflict {
        decision_id: String,
        expected: i64,
        actual: i64,
    },

    /// A ledger entry already exists for this `(decision, version)` pair.
    /// Unreachable under single-writer sequencing; guards double-append bugs.
    #[error("Ledger entry already exists for decision {decision_id} version {version}")]
    DuplicateVersion { decision_id: String, version: i64 },

    /// No resolvable actor identity for a mutating call.
    #[error("No resolvable actor identity")]
    AuthenticationRequired,

    /// Unexpected storage or internal failure. The transactional sequence
    /// that raised it has been fully rolled back.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl DecisionError {
    /// Shorthand for a validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a not-found failure.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
