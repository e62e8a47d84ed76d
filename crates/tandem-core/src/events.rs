//! Collaboration event envelope and sink trait.
//!
//! Every accepted mutation publishes one `CollabEvent` to the configured
//! `EventSink` after its transaction commits. Publication is fire-and-forget:
//! the sink may drop events, and a sink failure never fails the operation
//! that produced it.
//!
//! The `v` field supports envelope versioning: old journals without a `v`
//! field deserialize with `v == 1` via `#[serde(default)]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EventKind;

/// Default envelope version for journals written before the field existed.
const fn default_event_version() -> u32 {
    1
}

/// A single collaboration notification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CollabEvent {
    /// Envelope version. Defaults to 1 for old journals without this field.
    #[serde(default = "default_event_version")]
    pub v: u32,

    /// ISO 8601 timestamp of the mutation.
    pub ts: String,

    /// Actor id that performed the mutation.
    pub actor: String,

    /// What happened.
    pub event: EventKind,

    /// Decision the event concerns.
    pub decision_id: String,

    /// Chat the decision belongs to. Sinks fan out per chat.
    pub chat_id: String,

    /// Event payload. Schema depends on `event`.
    pub data: serde_json::Value,
}

/// Broadcast seam for the out-of-scope real-time push channel.
///
/// At-most-once effort; no delivery guarantee is required of implementations.
/// Callers treat `publish` failures as non-fatal.
pub trait EventSink: Send + Sync {
    /// Publish one event.
    ///
    /// # Errors
    ///
    /// Implementations may fail (I/O, transport); callers log and continue.
    fn publish(&self, event: &CollabEvent) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_roundtrip() {
        let event = CollabEvent {
            v: 1,
            ts: "2026-08-07T12:00:00Z".to_string(),
            actor: "usr-a3f8b2c1".to_string(),
            event: EventKind::DecisionCreated,
            decision_id: "decision-deadbeef".to_string(),
            chat_id: "chat-11111111".to_string(),
            data: serde_json::json!({"title": "Use REST or GraphQL?"}),
        };

        let json = serde_json::to_string(&event).unwrap();
        let recovered: CollabEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, event);
    }

    #[test]
    fn event_default_version() {
        // Old journal format without `v` — should deserialize with v=1
        let json = r#"{"ts":"2026-01-01T00:00:00Z","actor":"usr-00000000","event":"decision_updated","decision_id":"decision-11111111","chat_id":"chat-1","data":{}}"#;
        let event: CollabEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.v, 1);
        assert_eq!(event.event, EventKind::DecisionUpdated);
    }
}
