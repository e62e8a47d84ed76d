//! Database configuration.

use serde::{Deserialize, Serialize};

/// Default database file path, relative to the working directory.
fn default_path() -> String {
    ".tandem/decisions.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. `":memory:"` for an ephemeral store.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the configured store is in-memory.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.path == ":memory:"
    }
}
