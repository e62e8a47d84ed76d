//! Event journal configuration.

use serde::{Deserialize, Serialize};

/// Default journal directory, relative to the working directory.
fn default_dir() -> String {
    ".tandem/events".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
    /// Whether collaboration events are journaled at all.
    #[serde(default)]
    pub enabled: bool,

    /// Directory for per-chat JSONL event files.
    #[serde(default = "default_dir")]
    pub dir: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_dir(),
        }
    }
}
