//! Repository modules implementing the decision center operations.
//!
//! Read primitives live on `TandemDb`; the public operations are added to
//! `DecisionService` via `impl DecisionService` blocks.

pub mod conflict;
pub mod decision;
pub mod version;
