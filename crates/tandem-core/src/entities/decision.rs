use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::DecisionStatus;
use crate::errors::DecisionError;
use crate::value::DecisionValue;

/// A versioned decision record tracked within a chat.
///
/// Lock state invariant: `is_locked` is true iff `locked_by` and `locked_at`
/// are both set. `current_version` increases by exactly 1 on every accepted
/// update; lock transitions never change it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Decision {
    pub id: String,
    pub chat_id: String,
    pub title: String,
    pub value: DecisionValue,
    pub status: DecisionStatus,
    pub current_version: i64,
    pub is_locked: bool,
    pub locked_by: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Decision {
    /// The actor currently holding the advisory lock, if any.
    #[must_use]
    pub fn lock_holder(&self) -> Option<&str> {
        if self.is_locked {
            self.locked_by.as_deref()
        } else {
            None
        }
    }

    /// Gate for field-mutating updates: a lock held by a different actor
    /// blocks the mutation. The holder's own updates pass.
    ///
    /// # Errors
    ///
    /// Returns `DecisionError::Locked` when another actor holds the lock.
    pub fn ensure_mutable_by(&self, actor_id: &str) -> Result<(), DecisionError> {
        match self.lock_holder() {
            Some(holder) if holder != actor_id => Err(DecisionError::Locked {
                decision_id: self.id.clone(),
                locked_by: holder.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Gate for lock acquisition: re-acquiring by the current holder succeeds
    /// (and refreshes `locked_at`); anyone else is turned away.
    ///
    /// # Errors
    ///
    /// Returns `DecisionError::AlreadyLocked` when another actor holds the lock.
    pub fn ensure_lockable_by(&self, actor_id: &str) -> Result<(), DecisionError> {
        match self.lock_holder() {
            Some(holder) if holder != actor_id => Err(DecisionError::AlreadyLocked {
                decision_id: self.id.clone(),
                locked_by: holder.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Whether the lock fields satisfy the `is_locked ⇔ both set` invariant.
    #[must_use]
    pub const fn lock_state_consistent(&self) -> bool {
        self.is_locked == (self.locked_by.is_some() && self.locked_at.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decision(locked_by: Option<&str>) -> Decision {
        let now = Utc::now();
        Decision {
            id: "decision-a3f8b2c1".to_string(),
            chat_id: "chat-1".to_string(),
            title: "Transport protocol".to_string(),
            value: DecisionValue::new(json!({"question": "Q", "decisionType": "T"})),
            status: if locked_by.is_some() {
                DecisionStatus::Locked
            } else {
                DecisionStatus::Open
            },
            current_version: 1,
            is_locked: locked_by.is_some(),
            locked_by: locked_by.map(String::from),
            locked_at: locked_by.map(|_| now),
            created_by: "usr-alice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn unlocked_decision_is_mutable_and_lockable() {
        let d = decision(None);
        d.ensure_mutable_by("usr-bob").unwrap();
        d.ensure_lockable_by("usr-bob").unwrap();
    }

    #[test]
    fn foreign_lock_blocks_mutation() {
        let d = decision(Some("usr-alice"));
        let err = d.ensure_mutable_by("usr-bob").unwrap_err();
        assert!(matches!(err, DecisionError::Locked { locked_by, .. } if locked_by == "usr-alice"));
    }

    #[test]
    fn holder_passes_both_gates() {
        let d = decision(Some("usr-alice"));
        d.ensure_mutable_by("usr-alice").unwrap();
        d.ensure_lockable_by("usr-alice").unwrap();
    }

    #[test]
    fn foreign_lock_blocks_acquisition_as_already_locked() {
        let d = decision(Some("usr-alice"));
        let err = d.ensure_lockable_by("usr-bob").unwrap_err();
        assert!(matches!(err, DecisionError::AlreadyLocked { .. }));
    }

    #[test]
    fn lock_state_consistency() {
        assert!(decision(None).lock_state_consistent());
        assert!(decision(Some("usr-alice")).lock_state_consistent());

        let mut broken = decision(Some("usr-alice"));
        broken.locked_at = None;
        assert!(!broken.lock_state_consistent());
    }
}
