//! Verdict Collect
//!
//! Gathers judge outputs with the DUET protocol: two models answer the same
//! comparison prompt, see each other's answer, and are pressed for a final
//! `Response A`/`Response B` choice over four rounds. Every round's answer
//! lands in its own CSV column, ready for the classifiers.

pub mod duet;
pub mod provider;

pub use duet::{CollectConfig, DuetRow, DuetRunner, ModelSpec, Round, ERROR_SENTINEL};
pub use provider::{CompletionProvider, CompletionSettings, OpenAiCompatibleProvider};
