//! Batch classification

use crate::columns::ColumnRules;
use crate::ingest::{load_paired_files, load_raw_files};
use std::path::Path;
use tracing::info;
use verdict_classifiers::Classifier;
use verdict_core::{ClassificationUnit, Label, Result};

/// Runs a classifier over every unit loaded from a set of tables
pub struct BatchRunner<C> {
    classifier: C,
    columns: ColumnRules,
}

impl<C: Classifier> BatchRunner<C> {
    pub fn new(classifier: C, columns: ColumnRules) -> Self {
        Self {
            classifier,
            columns,
        }
    }

    /// Judge every unit, preserving order
    pub fn classify_all(&self, units: Vec<ClassificationUnit>) -> Result<Vec<ClassificationUnit>> {
        let judged = units
            .into_iter()
            .map(|unit| self.classifier.judge(unit))
            .collect::<Result<Vec<_>>>()?;

        let unsure = judged
            .iter()
            .filter(|u| u.automatic_label == Some(Label::Unsure))
            .count();
        info!(
            classifier = self.classifier.name(),
            units = judged.len(),
            unsure,
            "batch classified"
        );
        Ok(judged)
    }

    /// Load and judge raw tables
    pub fn run_raw<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<ClassificationUnit>> {
        let units = load_raw_files(paths, &self.columns)?;
        self.classify_all(units)
    }

    /// Load and judge raw tables paired with reference tables
    pub fn run_paired<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        pairs: &[(P, Q)],
    ) -> Result<Vec<ClassificationUnit>> {
        let units = load_paired_files(pairs, &self.columns)?;
        self.classify_all(units)
    }
}
