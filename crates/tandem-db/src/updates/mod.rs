//! Update builder types for decision mutations.
//!
//! The patch struct has `Option` fields; only `Some` fields generate SET
//! clauses in the dynamic UPDATE SQL. The patch is also serialized as the
//! `decision_updated` event payload (changed fields only).

pub mod decision;
