//! Classification units: one (prompt, model output) pair awaiting or holding a verdict

use crate::types::{DecisionCase, Label};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic content fingerprint of a raw model output.
///
/// Identical texts share a fingerprint, so this is a tracing aid only and
/// never a uniqueness key.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// One model output to be judged, with where it came from.
///
/// Field order is the column order of the debug export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationUnit {
    /// Prompt the model was answering
    pub prompt: String,

    /// Externally supplied reference label, or blank
    pub reference_label: String,

    /// Raw model output text
    pub raw_output: String,

    /// Known-correct label (validation data or human review)
    pub manual_label: Option<Label>,

    /// Label assigned by the classification engine
    pub automatic_label: Option<Label>,

    /// Decision path that produced `automatic_label`
    pub case: Option<DecisionCase>,

    /// Originating file
    pub source_file: Option<String>,

    /// Originating column
    pub source_column: Option<String>,

    /// Originating line (1 is the header row)
    pub source_line: Option<u64>,

    /// Fingerprint of `raw_output`
    pub id: String,
}

impl ClassificationUnit {
    /// Create an unclassified unit with no provenance
    pub fn new(
        prompt: impl Into<String>,
        reference_label: impl Into<String>,
        raw_output: impl Into<String>,
    ) -> Self {
        let raw_output = raw_output.into();
        Self {
            prompt: prompt.into(),
            reference_label: reference_label.into(),
            id: fingerprint(&raw_output),
            raw_output,
            manual_label: None,
            automatic_label: None,
            case: None,
            source_file: None,
            source_column: None,
            source_line: None,
        }
    }

    /// Attach provenance
    pub fn with_provenance(
        mut self,
        file: impl Into<String>,
        column: impl Into<String>,
        line: u64,
    ) -> Self {
        self.source_file = Some(file.into());
        self.source_column = Some(column.into());
        self.source_line = Some(line);
        self
    }

    /// Attach a known-correct label
    pub fn with_manual_label(mut self, label: Label) -> Self {
        self.manual_label = Some(label);
        self
    }

    /// Return a copy carrying an automatic verdict
    pub fn with_verdict(mut self, label: Label, case: DecisionCase) -> Self {
        self.automatic_label = Some(label);
        self.case = Some(case);
        self
    }

    /// Return a copy carrying a human reviewer's decision
    pub fn with_human_decision(self, label: Label) -> Self {
        self.with_verdict(label, DecisionCase::Deferred)
    }

    /// Whether the engine left this unit for a human
    pub fn needs_review(&self) -> bool {
        self.automatic_label == Some(Label::Unsure)
    }

    /// A concrete automatic label that contradicts a concrete manual one
    pub fn is_confidently_wrong(&self) -> bool {
        match (self.manual_label, self.automatic_label) {
            (Some(manual), Some(automatic)) => {
                manual.is_concrete() && automatic.is_concrete() && manual != automatic
            }
            _ => false,
        }
    }

    /// Whether the automatic label agrees with the manual one.
    ///
    /// A confidently wrong unit is logged at error level: the classifier must
    /// never pick the wrong side, and batch processing keeps going so every
    /// such unit surfaces in one run.
    pub fn is_correct(&self) -> bool {
        if self.is_confidently_wrong() {
            tracing::error!(unit = %self, "automatic label contradicts manual label");
        }
        self.manual_label == self.automatic_label
    }
}

impl fmt::Display for ClassificationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Debug>(value: &Option<T>) -> String {
            match value {
                Some(v) => format!("{:?}", v),
                None => "None".to_string(),
            }
        }

        write!(
            f,
            "ClassificationUnit(id={}, manual_label={}, automatic_label={}, case={}, source_file={}, source_column={}, source_line={})",
            self.id,
            opt(&self.manual_label),
            opt(&self.automatic_label),
            opt(&self.case),
            opt(&self.source_file),
            opt(&self.source_column),
            opt(&self.source_line),
        )
    }
}
