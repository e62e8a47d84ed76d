//! Entity structs for the Tandem decision center.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip.

mod conflict;
mod decision;
mod version;

pub use conflict::DecisionConflict;
pub use decision::Decision;
pub use version::DecisionVersion;
