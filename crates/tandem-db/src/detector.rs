//! Sibling selection for conflict detection.
//!
//! "Siblings" are the candidate set two decisions must both belong to before
//! their values are compared for divergence. The store fetches a same-chat
//! candidate pool; the strategy decides which candidates count as siblings.
//! Grouping by exact title equality is a proximity heuristic, not a semantic
//! guarantee — a similarity-search variant can replace the strategy without
//! touching the detector's suppression/creation logic in
//! `repos::conflict`.

use tandem_core::entities::Decision;

/// Pluggable sibling test over same-chat candidates.
pub trait SiblingStrategy: Send + Sync {
    /// Whether `candidate` is a sibling of `decision`.
    ///
    /// `candidate` is always from the same chat; implementations must
    /// exclude the decision itself.
    fn is_sibling(&self, decision: &Decision, candidate: &Decision) -> bool;
}

/// Default heuristic: same title (exact string equality), different id.
pub struct ExactTitleMatch;

impl SiblingStrategy for ExactTitleMatch {
    fn is_sibling(&self, decision: &Decision, candidate: &Decision) -> bool {
        candidate.id != decision.id && candidate.title == decision.title
    }
}
