//! Status enums, conflict kinds, and event kinds for Tandem.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `DecisionStatus` provides `allowed_next_states()` to enforce valid transitions
//! at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DecisionStatus
// ---------------------------------------------------------------------------

/// Status of a decision record.
///
/// ```text
/// open ⇄ locked
/// open → resolved
/// ```
///
/// The `open ⇄ locked` transition is driven by lock acquisition/release.
/// `resolved` is set by a separate resolution workflow and is terminal here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Open,
    Locked,
    Resolved,
}

impl DecisionStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::Locked, Self::Resolved],
            Self::Locked => &[Self::Open],
            Self::Resolved => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConflictStatus
// ---------------------------------------------------------------------------

/// Status of a detected conflict. Resolution is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    Open,
    Resolved,
}

impl ConflictStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ConflictType
// ---------------------------------------------------------------------------

/// Kind of divergence a conflict record captures.
///
/// Only `value_mismatch` is produced today; the enum leaves room for
/// structural or title-level detection without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    ValueMismatch,
}

impl ConflictType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValueMismatch => "value_mismatch",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Collaboration event types published to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DecisionCreated,
    DecisionUpdated,
    DecisionLocked,
    DecisionUnlocked,
    DecisionConflictDetected,
    DecisionConflictResolved,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DecisionCreated => "decision_created",
            Self::DecisionUpdated => "decision_updated",
            Self::DecisionLocked => "decision_locked",
            Self::DecisionUnlocked => "decision_unlocked",
            Self::DecisionConflictDetected => "decision_conflict_detected",
            Self::DecisionConflictResolved => "decision_conflict_resolved",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(status_open, DecisionStatus, DecisionStatus::Open, "open");
    test_serde_roundtrip!(status_locked, DecisionStatus, DecisionStatus::Locked, "locked");
    test_serde_roundtrip!(
        status_resolved,
        DecisionStatus,
        DecisionStatus::Resolved,
        "resolved"
    );

    test_serde_roundtrip!(
        conflict_open,
        ConflictStatus,
        ConflictStatus::Open,
        "open"
    );
    test_serde_roundtrip!(
        conflict_resolved,
        ConflictStatus,
        ConflictStatus::Resolved,
        "resolved"
    );

    test_serde_roundtrip!(
        conflict_type_value_mismatch,
        ConflictType,
        ConflictType::ValueMismatch,
        "value_mismatch"
    );

    test_serde_roundtrip!(
        event_created,
        EventKind,
        EventKind::DecisionCreated,
        "decision_created"
    );
    test_serde_roundtrip!(
        event_conflict_resolved,
        EventKind,
        EventKind::DecisionConflictResolved,
        "decision_conflict_resolved"
    );

    #[test]
    fn decision_status_valid_transitions() {
        assert!(DecisionStatus::Open.can_transition_to(DecisionStatus::Locked));
        assert!(DecisionStatus::Open.can_transition_to(DecisionStatus::Resolved));
        assert!(DecisionStatus::Locked.can_transition_to(DecisionStatus::Open));
    }

    #[test]
    fn decision_status_invalid_transitions() {
        assert!(!DecisionStatus::Locked.can_transition_to(DecisionStatus::Resolved));
        assert!(!DecisionStatus::Resolved.can_transition_to(DecisionStatus::Open));
        assert!(DecisionStatus::Resolved.allowed_next_states().is_empty());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", DecisionStatus::Locked), "locked");
        assert_eq!(format!("{}", ConflictStatus::Resolved), "resolved");
        assert_eq!(format!("{}", ConflictType::ValueMismatch), "value_mismatch");
        assert_eq!(
            format!("{}", EventKind::DecisionConflictDetected),
            "decision_conflict_detected"
        );
    }
}
