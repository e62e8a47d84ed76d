//! Event sink implementations.
//!
//! The service publishes a `CollabEvent` after every committed mutation.
//! `JsonlEventSink` journals events to per-chat `.jsonl` files so the
//! out-of-scope push channel can fan them out; `NoopSink` drops everything;
//! `MemorySink` captures events for tests and embedders.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tandem_core::events::{CollabEvent, EventSink};

use crate::error::StoreError;

/// Appends collaboration events to per-chat JSONL files.
///
/// File path: `{dir}/{chat_id}.jsonl`. Uses
/// `serde_jsonlines::append_json_lines` for per-line appends. Publication is
/// best-effort by contract — the caller logs failures and moves on.
pub struct JsonlEventSink {
    dir: PathBuf,
    enabled: bool,
}

impl JsonlEventSink {
    /// Create a new sink pointing at the given directory.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the directory cannot be created.
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Other(e.into()))?;
        Ok(Self { dir, enabled: true })
    }

    /// Create a disabled sink (events are silently dropped).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    /// Whether journaling is currently enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The directory where event files are stored.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl EventSink for JsonlEventSink {
    fn publish(&self, event: &CollabEvent) -> anyhow::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let path = self.dir.join(format!("{}.jsonl", event.chat_id));
        serde_jsonlines::append_json_lines(&path, [event])?;
        Ok(())
    }
}

/// Sink that drops every event.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn publish(&self, _event: &CollabEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Sink that captures events in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<CollabEvent>>>,
}

impl MemorySink {
    /// Snapshot of all captured events, in publication order.
    ///
    /// # Panics
    ///
    /// Panics if the buffer mutex is poisoned.
    #[must_use]
    pub fn events(&self) -> Vec<CollabEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: &CollabEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("event buffer poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

/// Sink that fails every publish. Exercises the best-effort contract in tests.
pub struct FailingSink;

impl EventSink for FailingSink {
    fn publish(&self, event: &CollabEvent) -> anyhow::Result<()> {
        anyhow::bail!("sink unavailable for {}", event.event)
    }
}
