//! Verdict Classifiers
//!
//! Turns one free-form model output into `Response A`, `Response B` or
//! `Unsure`.
//!
//! Classification is a cascade:
//! - Case 0: the normalized output opens with the verdict itself
//! - Case 1: weighted voting over a catalog of definitive (weight 3) and
//!   suggestive (weight 1) phrasings
//! - Case 2: nothing matched, or the vote was contested; left for a human
//!
//! Everything here is synchronous and stateless, so one engine can be shared
//! across threads.

pub mod classifier;
pub mod engine;
pub mod normalize;
pub mod patterns;
pub mod resolver;

pub use classifier::Classifier;
pub use engine::{PatternMatch, Verdict, VerdictEngine, VoteOutcome, VoteTally, CONFLICT_MARGIN};
pub use normalize::normalize;
pub use patterns::{
    PatternCatalog, PatternHit, PatternTemplate, Tier, TokenLocation, DEFINITIVE_PATTERNS,
    SUGGESTIVE_PATTERNS,
};
pub use resolver::resolve;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::engine::{Verdict, VerdictEngine};
    pub use crate::normalize::normalize;
    pub use crate::resolver::resolve;
}
