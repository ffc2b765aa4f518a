//! Classifier trait

use crate::engine::Verdict;
use verdict_core::{ClassificationUnit, Result};

/// Trait for verdict classifiers.
///
/// Implementations must be pure: the same text always yields the same
/// verdict, and no call may depend on an earlier one.
pub trait Classifier: Send + Sync {
    /// Classify one raw model output
    fn classify(&self, text: &str) -> Result<Verdict>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Classify a unit's raw output and return the unit carrying the verdict
    fn judge(&self, unit: ClassificationUnit) -> Result<ClassificationUnit> {
        let span = tracing::debug_span!(
            "judge",
            classifier = self.name(),
            id = %unit.id,
            file = unit.source_file.as_deref().unwrap_or(""),
            column = unit.source_column.as_deref().unwrap_or(""),
            line = unit.source_line.unwrap_or(0),
        );
        let _entered = span.enter();

        let verdict = self.classify(&unit.raw_output)?;
        Ok(unit.with_verdict(verdict.label, verdict.case))
    }
}
