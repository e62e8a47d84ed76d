use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::DecisionValue;

/// An immutable ledger entry: the full value snapshot of a decision at one
/// version number. Exactly one entry exists per `(decision_id, version_number)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionVersion {
    pub decision_id: String,
    pub version_number: i64,
    pub value: DecisionValue,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub reason: String,
    pub metadata: Option<serde_json::Value>,
}
