//! ID prefix constants.
//!
//! IDs are formatted `{prefix}-{8 lowercase hex}`, generated in SQL via
//! `randomblob(4)` (see `TandemDb::generate_id`).

pub const PREFIX_DECISION: &str = "decision";
pub const PREFIX_CONFLICT: &str = "conflict";

/// All known prefixes, for exhaustive generation tests.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_DECISION, PREFIX_CONFLICT];
