//! Shared test utilities for tandem-db tests.

pub(crate) mod helpers {
    use serde_json::json;
    use tandem_core::identity::ActorIdentity;
    use tandem_core::value::DecisionValue;

    use crate::TandemDb;
    use crate::events::{MemorySink, NoopSink};
    use crate::service::DecisionService;

    /// In-memory service with events dropped (for pure state tests).
    pub async fn test_service() -> DecisionService {
        let db = TandemDb::open_local(":memory:").await.unwrap();
        DecisionService::from_db(db, Box::new(NoopSink))
    }

    /// In-memory service plus a handle to its captured events.
    pub async fn test_service_with_sink() -> (DecisionService, MemorySink) {
        let db = TandemDb::open_local(":memory:").await.unwrap();
        let sink = MemorySink::default();
        let svc = DecisionService::from_db(db, Box::new(sink.clone()));
        (svc, sink)
    }

    /// Actor fixture; display name derived from the id.
    pub fn actor(id: &str) -> ActorIdentity {
        ActorIdentity::new(id, id.trim_start_matches("usr-"))
    }

    /// A well-formed decision value document.
    pub fn sample_value() -> DecisionValue {
        DecisionValue::new(json!({
            "question": "Use REST or GraphQL?",
            "decisionType": "architecture",
            "options": ["REST", "GraphQL"],
        }))
    }
}
