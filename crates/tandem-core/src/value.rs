//! The opaque decision value document.
//!
//! A decision's `value` is an open-ended structured document supplied by the
//! client and round-tripped as-is. The core inspects exactly three fields —
//! `question`, `decisionType`, `options` — and validates only their shape,
//! at the edges of the write path. Everything else passes through untouched.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::DecisionError;

/// Opaque structured document held by a decision.
///
/// Structural equality (`PartialEq`) is the divergence test used by conflict
/// detection: two values conflict iff their JSON trees differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct DecisionValue(serde_json::Value);

impl DecisionValue {
    #[must_use]
    pub const fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The `question` field, when present as a string.
    #[must_use]
    pub fn question(&self) -> Option<&str> {
        self.0.get("question").and_then(serde_json::Value::as_str)
    }

    /// The `decisionType` field, when present as a string.
    #[must_use]
    pub fn decision_type(&self) -> Option<&str> {
        self.0
            .get("decisionType")
            .and_then(serde_json::Value::as_str)
    }

    /// The `options` field, when present as an array.
    #[must_use]
    pub fn options(&self) -> Option<&Vec<serde_json::Value>> {
        self.0.get("options").and_then(serde_json::Value::as_array)
    }

    /// Borrow the underlying JSON.
    #[must_use]
    pub const fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// Unwrap into the underlying JSON.
    #[must_use]
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }

    /// Creation shape rules: non-empty `question` and `decisionType` strings,
    /// and — when `options` is present — an array of at least 2 entries.
    ///
    /// # Errors
    ///
    /// Returns `DecisionError::Validation` with a field-specific message.
    pub fn validate_new(&self) -> Result<(), DecisionError> {
        if !self.0.is_object() {
            return Err(DecisionError::validation(
                "value",
                "value must be a structured object",
            ));
        }
        match self.question() {
            Some(q) if !q.trim().is_empty() => {}
            _ => {
                return Err(DecisionError::validation(
                    "value.question",
                    "question must be a non-empty string",
                ));
            }
        }
        match self.decision_type() {
            Some(t) if !t.trim().is_empty() => {}
            _ => {
                return Err(DecisionError::validation(
                    "value.decisionType",
                    "decisionType must be a non-empty string",
                ));
            }
        }
        self.validate_options()
    }

    /// Options shape rule alone. Updates re-validate only this — question and
    /// decisionType are not re-checked once a decision exists.
    ///
    /// # Errors
    ///
    /// Returns `DecisionError::Validation` when `options` is present but is
    /// not an array, or holds fewer than 2 entries.
    pub fn validate_options(&self) -> Result<(), DecisionError> {
        let Some(raw) = self.0.get("options") else {
            return Ok(());
        };
        let Some(options) = raw.as_array() else {
            return Err(DecisionError::validation(
                "value.options",
                "options must be an array",
            ));
        };
        if options.len() < 2 {
            return Err(DecisionError::validation(
                "value.options",
                "options must contain at least 2 options",
            ));
        }
        Ok(())
    }
}

impl From<serde_json::Value> for DecisionValue {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
