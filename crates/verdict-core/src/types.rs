//! Core types for verdict

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two candidate responses a model output settled on.
///
/// `Unsure` is only ever an automatic placeholder: no human or reference
/// judgment may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    A,
    B,
    Unsure,
}

impl Label {
    /// Display form used in clean exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "Response A",
            Self::B => "Response B",
            Self::Unsure => "UNSURE",
        }
    }

    /// Whether this is a concrete `A`/`B` decision
    pub fn is_concrete(&self) -> bool {
        !matches!(self, Self::Unsure)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision path that produced a unit's automatic label.
///
/// Serialized as its integer index so exports stay comparable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum DecisionCase {
    /// The normalized output starts with the verdict itself
    ExactPrefix,
    /// Weighted voting over the pattern catalog
    Voting,
    /// Left for (or settled by) a human reviewer
    Deferred,
}

impl DecisionCase {
    /// Number of distinct decision cases
    pub const COUNT: usize = 3;

    /// All cases in index order
    pub const ALL: [DecisionCase; Self::COUNT] = [Self::ExactPrefix, Self::Voting, Self::Deferred];

    /// Integer index of this case
    pub fn index(&self) -> u8 {
        match self {
            Self::ExactPrefix => 0,
            Self::Voting => 1,
            Self::Deferred => 2,
        }
    }

    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactPrefix => "exact_prefix",
            Self::Voting => "voting",
            Self::Deferred => "deferred",
        }
    }
}

impl From<DecisionCase> for u8 {
    fn from(case: DecisionCase) -> Self {
        case.index()
    }
}

impl TryFrom<u8> for DecisionCase {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ExactPrefix),
            1 => Ok(Self::Voting),
            2 => Ok(Self::Deferred),
            other => Err(format!("unknown decision case {}", other)),
        }
    }
}

impl fmt::Display for DecisionCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display() {
        assert_eq!(Label::A.to_string(), "Response A");
        assert_eq!(Label::B.to_string(), "Response B");
        assert_eq!(Label::Unsure.to_string(), "UNSURE");
        assert!(Label::A.is_concrete());
        assert!(!Label::Unsure.is_concrete());
    }

    #[test]
    fn test_case_index_conversion() {
        for case in DecisionCase::ALL {
            assert_eq!(DecisionCase::try_from(case.index()), Ok(case));
        }
        assert!(DecisionCase::try_from(3).is_err());
    }

    #[test]
    fn test_case_serializes_as_integer() {
        let json = serde_json::to_string(&DecisionCase::Voting).unwrap();
        assert_eq!(json, "1");
        let case: DecisionCase = serde_json::from_str("2").unwrap();
        assert_eq!(case, DecisionCase::Deferred);
    }
}
