//! Actor identity for cross-crate passing.
//!
//! Identity resolution itself (tokens, sessions) lives outside this core.
//! Every `DecisionService` operation takes the acting identity as an explicit
//! parameter — there is no ambient "current actor" state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::DecisionError;

/// Resolved identity of the acting user. Data only — no auth logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActorIdentity {
    /// Stable user id (e.g. `usr-a3f8b2c1`).
    pub id: String,
    /// Human-readable name for event payloads and audit stamps.
    pub display_name: String,
}

impl ActorIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Seam for the out-of-scope identity collaborator.
///
/// The compatibility layer implements this against its auth stack and calls
/// `require_actor` before invoking any mutating operation.
pub trait IdentityProvider: Send + Sync {
    /// Resolve the current actor, or `None` when unauthenticated.
    fn resolve_actor(&self) -> Option<ActorIdentity>;

    /// Resolve the current actor or fail with `AuthenticationRequired`.
    ///
    /// # Errors
    ///
    /// Returns `DecisionError::AuthenticationRequired` when no actor resolves.
    fn require_actor(&self) -> Result<ActorIdentity, DecisionError> {
        self.resolve_actor()
            .ok_or(DecisionError::AuthenticationRequired)
    }
}
