//! Verdict Core
//!
//! Core types shared across the verdict workspace.
//!
//! This crate provides:
//! - The two-option verdict [`Label`] and the [`DecisionCase`] that produced it
//! - [`ClassificationUnit`], one (prompt, model output) pair with provenance
//! - Error types and result handling
//! - Chat message types used when collecting model outputs

pub mod error;
pub mod types;
pub mod unit;

pub use error::{Error, Result};
pub use types::{ChatMessage, DecisionCase, Label};
pub use unit::{fingerprint, ClassificationUnit};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ChatMessage, DecisionCase, Label};
    pub use crate::unit::ClassificationUnit;
}
