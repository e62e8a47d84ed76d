use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ConflictStatus, ConflictType};

/// A materialized, user-resolvable note that two sibling decisions hold
/// divergent values.
///
/// At most one open conflict of a given type exists per decision; the
/// detector suppresses re-detection while one is open. Resolution is an
/// acknowledgment — it never touches the decision's value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionConflict {
    pub id: String,
    pub decision_id: String,
    pub conflict_type: ConflictType,
    pub description: String,
    pub status: ConflictStatus,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub resolution: Option<String>,
    /// Audit blob; carries `sibling_id` for the decision that triggered detection.
    pub metadata: Option<serde_json::Value>,
}

impl DecisionConflict {
    /// Sibling decision id recorded at detection time, when present.
    #[must_use]
    pub fn sibling_id(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("sibling_id"))
            .and_then(serde_json::Value::as_str)
    }
}
