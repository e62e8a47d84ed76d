//! End-to-end flows through the public `DecisionService` API: create through
//! conflict resolution, the lock/version write gates, and revert.

use serde_json::json;

use tandem_core::enums::{ConflictStatus, DecisionStatus};
use tandem_core::errors::DecisionError;
use tandem_core::identity::ActorIdentity;
use tandem_core::value::DecisionValue;
use tandem_db::TandemDb;
use tandem_db::events::MemorySink;
use tandem_db::service::DecisionService;
use tandem_db::updates::decision::DecisionUpdateBuilder;

async fn service_with_sink() -> (DecisionService, MemorySink) {
    // Surfaces tracing output from the best-effort paths under --nocapture.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();

    let db = TandemDb::open_local(":memory:").await.unwrap();
    let sink = MemorySink::default();
    let svc = DecisionService::from_db(db, Box::new(sink.clone()));
    (svc, sink)
}

fn alice() -> ActorIdentity {
    ActorIdentity::new("usr-alice", "Alice")
}

fn bob() -> ActorIdentity {
    ActorIdentity::new("usr-bob", "Bob")
}

#[tokio::test]
async fn create_returns_version_one_open_with_one_ledger_entry() {
    let (svc, _) = service_with_sink().await;

    let view = svc
        .create_decision(
            &alice(),
            "chat-1",
            "API style",
            DecisionValue::new(json!({
                "question": "Use REST or GraphQL?",
                "decisionType": "architecture",
                "options": ["REST", "GraphQL"],
            })),
            None,
        )
        .await
        .unwrap();

    assert_eq!(view.decision.current_version, 1);
    assert_eq!(view.decision.status, DecisionStatus::Open);
    assert_eq!(view.open_conflicts, 0);

    let history = svc.get_history(&view.decision.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version_number, 1);
}

#[tokio::test]
async fn create_with_one_option_fails_validation() {
    let (svc, _) = service_with_sink().await;

    let err = svc
        .create_decision(
            &alice(),
            "chat-1",
            "API style",
            DecisionValue::new(json!({
                "question": "X",
                "decisionType": "Y",
                "options": ["only-one"],
            })),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DecisionError::Validation { .. }));
    assert!(err.to_string().contains("at least 2 options"));
}

#[tokio::test]
async fn lock_by_a_blocks_update_by_b() {
    let (svc, _) = service_with_sink().await;

    let view = svc
        .create_decision(
            &alice(),
            "chat-1",
            "API style",
            DecisionValue::new(json!({"question": "Q", "decisionType": "T"})),
            None,
        )
        .await
        .unwrap();
    let id = view.decision.id.clone();

    svc.lock_decision(&alice(), &id, Some("drafting")).await.unwrap();

    let err = svc
        .update_decision(&bob(), &id, DecisionUpdateBuilder::new().title("new").build())
        .await
        .unwrap_err();
    assert!(matches!(err, DecisionError::Locked { .. }));

    let decision = svc.get_decision(&id).await.unwrap();
    assert_eq!(decision.title, "API style");
    assert_eq!(decision.status, DecisionStatus::Locked);
}

#[tokio::test]
async fn stale_expected_version_carries_expected_and_actual() {
    let (svc, _) = service_with_sink().await;

    let view = svc
        .create_decision(
            &alice(),
            "chat-1",
            "API style",
            DecisionValue::new(json!({"question": "Q", "decisionType": "T"})),
            None,
        )
        .await
        .unwrap();
    let id = view.decision.id.clone();

    svc.update_decision(&alice(), &id, DecisionUpdateBuilder::new().title("v2").build())
        .await
        .unwrap();

    let err = svc
        .update_decision(
            &bob(),
            &id,
            DecisionUpdateBuilder::new()
                .title("racing write")
                .expected_version(1)
                .build(),
        )
        .await
        .unwrap_err();

    match err {
        DecisionError::VersionConflict {
            expected, actual, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("expected VersionConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn sibling_conflict_detected_and_resolved_end_to_end() {
    let (svc, sink) = service_with_sink().await;

    let d1 = svc
        .create_decision(
            &alice(),
            "c1",
            "T",
            DecisionValue::new(json!({"question": "Q", "decisionType": "T", "a": 1})),
            None,
        )
        .await
        .unwrap();
    let d2 = svc
        .create_decision(
            &bob(),
            "c1",
            "T",
            DecisionValue::new(json!({"question": "Q", "decisionType": "T", "a": 2})),
            None,
        )
        .await
        .unwrap();

    assert_eq!(d2.open_conflicts, 1);
    let conflicts = svc.get_conflicts(&d2.decision.id).await.unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].sibling_id(), Some(d1.decision.id.as_str()));

    let resolved = svc
        .resolve_conflict(&alice(), &d2.decision.id, &conflicts[0].id, "both stand")
        .await
        .unwrap();
    assert_eq!(resolved.status, ConflictStatus::Resolved);

    // Resolution left the value alone.
    let decision = svc.get_decision(&d2.decision.id).await.unwrap();
    assert_eq!(
        decision.value,
        DecisionValue::new(json!({"question": "Q", "decisionType": "T", "a": 2}))
    );

    let events = sink.events();
    let mut counts = std::collections::HashMap::new();
    for event in &events {
        *counts.entry(event.event.as_str()).or_insert(0) += 1;
    }
    assert_eq!(counts["decision_created"], 2);
    assert_eq!(counts["decision_conflict_detected"], 1);
    assert_eq!(counts["decision_conflict_resolved"], 1);
}

#[tokio::test]
async fn revert_replays_snapshot_as_new_version() {
    let (svc, _) = service_with_sink().await;

    let original = DecisionValue::new(json!({"question": "Q", "decisionType": "T", "pick": "x"}));
    let view = svc
        .create_decision(&alice(), "chat-1", "Pick", original.clone(), None)
        .await
        .unwrap();
    let id = view.decision.id.clone();

    for pick in ["y", "z"] {
        svc.update_decision(
            &alice(),
            &id,
            DecisionUpdateBuilder::new()
                .value(DecisionValue::new(
                    json!({"question": "Q", "decisionType": "T", "pick": pick}),
                ))
                .build(),
        )
        .await
        .unwrap();
    }

    let reverted = svc.revert_decision(&bob(), &id, 1, None).await.unwrap();
    assert_eq!(reverted.decision.current_version, 4);
    assert_eq!(reverted.decision.value, original);

    let history = svc.get_history(&id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].changed_by, "usr-bob");
    assert_eq!(history[0].reason, "revert to version 1");
    // Every earlier snapshot is still in place.
    assert_eq!(history[3].value, original);
}

#[tokio::test]
async fn unlock_by_non_holder_reopens_the_decision() {
    let (svc, _) = service_with_sink().await;

    let view = svc
        .create_decision(
            &alice(),
            "chat-1",
            "T",
            DecisionValue::new(json!({"question": "Q", "decisionType": "T"})),
            None,
        )
        .await
        .unwrap();
    let id = view.decision.id.clone();

    svc.lock_decision(&alice(), &id, None).await.unwrap();
    let unlocked = svc.unlock_decision(&bob(), &id).await.unwrap();

    assert!(!unlocked.is_locked);
    assert_eq!(unlocked.status, DecisionStatus::Open);
    assert!(unlocked.lock_state_consistent());
}
