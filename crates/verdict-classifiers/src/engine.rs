//! Classification engine: exact prefix, then weighted voting, then deferral

use crate::classifier::Classifier;
use crate::normalize::normalize;
use crate::patterns::{PatternCatalog, Tier, TokenLocation};
use crate::resolver::resolve;
use tracing::{debug, info, warn};
use verdict_core::{DecisionCase, Label, Result};

/// Vote margin at which support for both labels counts as a conflict
pub const CONFLICT_MARGIN: u32 = 3;

/// Votes accumulated for each label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub a: u32,
    pub b: u32,
}

/// How a tally settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// No template fired
    NoVotes,
    /// One label carries the vote
    Winner(Label),
    /// Both labels hold the same nonzero total
    Tie,
    /// Both labels have support and the margin reaches [`CONFLICT_MARGIN`]
    Conflict,
}

impl VoteTally {
    /// Add `weight` votes for `label`. `Unsure` is never voted for.
    pub fn add(&mut self, label: Label, weight: u32) {
        match label {
            Label::A => self.a += weight,
            Label::B => self.b += weight,
            Label::Unsure => {}
        }
    }

    /// Settle the tally
    pub fn outcome(&self) -> VoteOutcome {
        match (self.a, self.b) {
            (0, 0) => VoteOutcome::NoVotes,
            (_, 0) => VoteOutcome::Winner(Label::A),
            (0, _) => VoteOutcome::Winner(Label::B),
            (a, b) if a.abs_diff(b) >= CONFLICT_MARGIN => VoteOutcome::Conflict,
            (a, b) if a == b => VoteOutcome::Tie,
            (a, b) if a > b => VoteOutcome::Winner(Label::A),
            _ => VoteOutcome::Winner(Label::B),
        }
    }
}

/// A template that contributed to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub tier: Tier,
    pub index: usize,
    pub label: Label,
}

/// Result of classifying one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Resolved label
    pub label: Label,

    /// Decision path
    pub case: DecisionCase,

    /// Vote totals (empty for an exact prefix match)
    pub votes: VoteTally,

    /// Templates that fired, in catalog order
    pub matches: Vec<PatternMatch>,
}

impl Verdict {
    fn exact_prefix(label: Label) -> Self {
        Self {
            label,
            case: DecisionCase::ExactPrefix,
            votes: VoteTally::default(),
            matches: Vec::new(),
        }
    }

    /// Whether the verdict was left for a human
    pub fn is_deferred(&self) -> bool {
        self.case == DecisionCase::Deferred
    }
}

/// Rule-based classifier over a [`PatternCatalog`]
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    catalog: PatternCatalog,
}

impl VerdictEngine {
    /// Create an engine over the built-in catalog
    pub fn new() -> Result<Self> {
        Ok(Self::with_catalog(PatternCatalog::new()?))
    }

    /// Create an engine over a custom catalog
    pub fn with_catalog(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog this engine votes with
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    fn vote(&self, normalized: &str) -> Result<Verdict> {
        let mut votes = VoteTally::default();
        let mut matches = Vec::new();

        for hit in self.catalog.scan(normalized) {
            let label = resolve(hit.token)?;
            debug!(
                tier = hit.tier.as_str(),
                index = hit.index,
                %label,
                "pattern matched"
            );
            votes.add(label, hit.tier.weight());
            matches.push(PatternMatch {
                tier: hit.tier,
                index: hit.index,
                label,
            });
        }

        let (label, case) = match votes.outcome() {
            VoteOutcome::Winner(label) => (label, DecisionCase::Voting),
            VoteOutcome::Conflict => {
                warn!(a = votes.a, b = votes.b, "voting conflict, deferring to manual review");
                (Label::Unsure, DecisionCase::Deferred)
            }
            VoteOutcome::Tie => {
                warn!(a = votes.a, b = votes.b, "tied vote, deferring to manual review");
                (Label::Unsure, DecisionCase::Deferred)
            }
            VoteOutcome::NoVotes => {
                debug!("no pattern matched");
                (Label::Unsure, DecisionCase::Deferred)
            }
        };

        Ok(Verdict {
            label,
            case,
            votes,
            matches,
        })
    }
}

impl Default for VerdictEngine {
    fn default() -> Self {
        Self::new().expect("Failed to create verdict engine")
    }
}

impl Classifier for VerdictEngine {
    fn classify(&self, text: &str) -> Result<Verdict> {
        let normalized = normalize(text);

        // Case 0: the output opens with the verdict itself
        if let Some(prefix) = normalized.get(..TokenLocation::STANDARD_LEN) {
            if prefix == "responsea" || prefix == "responseb" {
                let verdict = Verdict::exact_prefix(resolve(prefix)?);
                info!(label = %verdict.label, case = %verdict.case, "classified");
                return Ok(verdict);
            }
        }

        let verdict = self.vote(&normalized)?;
        info!(
            label = %verdict.label,
            case = %verdict.case,
            a = verdict.votes.a,
            b = verdict.votes.b,
            "classified"
        );
        Ok(verdict)
    }

    fn name(&self) -> &str {
        "pattern_vote"
    }
}
