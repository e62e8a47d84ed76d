//! Decision update builder.

use serde::Serialize;
use tandem_core::value::DecisionValue;

/// Patch for `update_decision`. `expected_version` is the optimistic
/// concurrency token: when set, the update fails unless it matches the
/// decision's `current_version` at execution time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecisionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<DecisionValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DecisionUpdate {
    /// Whether the patch mutates no fields (concurrency token and reason
    /// alone do not count).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.value.is_none()
    }
}

pub struct DecisionUpdateBuilder(DecisionUpdate);

impl DecisionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(DecisionUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn value(mut self, value: DecisionValue) -> Self {
        self.0.value = Some(value);
        self
    }

    #[must_use]
    pub const fn expected_version(mut self, version: i64) -> Self {
        self.0.expected_version = Some(version);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.0.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn build(self) -> DecisionUpdate {
        self.0
    }
}

impl Default for DecisionUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
