//! Service layer orchestrating decision mutations.
//!
//! `DecisionService` wraps `TandemDb` (raw database access), an `EventSink`
//! (post-commit notifications), and a `SiblingStrategy` (conflict-detection
//! grouping). All operation methods are implemented as `impl DecisionService`
//! blocks in [`crate::repos`].
//!
//! Every mutation method follows this protocol:
//! 1. Validate input and re-read current state
//! 2. Enforce the lock gate and the optimistic version check
//! 3. Begin transaction → execute SQL → append ledger entry → commit
//! 4. Scan for conflicts (post-commit, best-effort)
//! 5. Publish the collaboration event (post-commit, best-effort)
//!
//! Steps 4 and 5 log failures via `tracing::warn!` and never fail the
//! operation — the primary mutation has already committed.

use chrono::Utc;
use serde_json::Value;

use tandem_config::TandemConfig;
use tandem_core::entities::Decision;
use tandem_core::enums::EventKind;
use tandem_core::events::{CollabEvent, EventSink};
use tandem_core::identity::ActorIdentity;

use crate::TandemDb;
use crate::detector::{ExactTitleMatch, SiblingStrategy};
use crate::error::StoreError;
use crate::events::{JsonlEventSink, NoopSink};

/// Orchestrates decision mutations over the store, event sink, and sibling
/// strategy.
pub struct DecisionService {
    db: TandemDb,
    events: Box<dyn EventSink>,
    siblings: Box<dyn SiblingStrategy>,
}

impl DecisionService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for tests.
    /// * `events` — Sink for post-commit collaboration events.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened.
    pub async fn new_local(
        db_path: &str,
        events: Box<dyn EventSink>,
    ) -> Result<Self, StoreError> {
        let db = TandemDb::open_local(db_path).await?;
        Ok(Self::from_db(db, events))
    }

    /// Create a service from layered configuration.
    ///
    /// Journals events to per-chat JSONL files when `events.enabled` is set;
    /// otherwise events are dropped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or the event
    /// directory cannot be created.
    pub async fn from_config(config: &TandemConfig) -> Result<Self, StoreError> {
        let events: Box<dyn EventSink> = if config.events.enabled {
            Box::new(JsonlEventSink::new(config.events.dir.clone().into())?)
        } else {
            Box::new(NoopSink)
        };
        Self::new_local(&config.database.path, events).await
    }

    /// Create from an existing `TandemDb` (for testing).
    #[must_use]
    pub fn from_db(db: TandemDb, events: Box<dyn EventSink>) -> Self {
        Self {
            db,
            events,
            siblings: Box::new(ExactTitleMatch),
        }
    }

    /// Replace the sibling strategy (e.g. with a similarity-based one).
    #[must_use]
    pub fn with_sibling_strategy(mut self, siblings: Box<dyn SiblingStrategy>) -> Self {
        self.siblings = siblings;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &TandemDb {
        &self.db
    }

    pub(crate) fn siblings(&self) -> &dyn SiblingStrategy {
        self.siblings.as_ref()
    }

    /// Publish an event, swallowing (but logging) sink failures.
    pub(crate) fn emit(
        &self,
        actor: &ActorIdentity,
        kind: EventKind,
        decision: &Decision,
        data: Value,
    ) {
        let event = CollabEvent {
            v: 1,
            ts: Utc::now().to_rfc3339(),
            actor: actor.id.clone(),
            event: kind,
            decision_id: decision.id.clone(),
            chat_id: decision.chat_id.clone(),
            data,
        };
        if let Err(err) = self.events.publish(&event) {
            tracing::warn!(
                event = %event.event,
                decision_id = %event.decision_id,
                "event publication failed: {err}"
            );
        }
    }
}
