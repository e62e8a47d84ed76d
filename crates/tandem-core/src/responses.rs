//! Typed results returned by `DecisionService` operations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Decision;

/// A decision plus its open-conflict count, as returned by mutating
/// operations. The count is read after the post-commit conflict scan, so a
/// create that immediately detects a divergence already reports it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionView {
    pub decision: Decision,
    pub open_conflicts: u64,
}

/// One page of a chat's decisions, newest-updated first.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionPage {
    pub decisions: Vec<Decision>,
    /// Total matching rows, independent of `limit`/`offset`.
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}
