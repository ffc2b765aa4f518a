//! Which columns of a raw table hold model outputs to classify

use regex::Regex;
use verdict_core::{Error, Result};

/// Default exclusion pattern for raw DUET tables
pub const DEFAULT_EXCLUDE_COLUMNS: &str = "(Prompt1)|(Label)|(Unnamed: 1)|(.*_(i|I)nitial)";

/// Column layout of raw and reference tables
#[derive(Debug, Clone)]
pub struct ColumnRules {
    prompt_column: String,
    label_column: String,
    exclude: Regex,
}

impl ColumnRules {
    /// Create column rules.
    ///
    /// `exclude` is matched from the start of a column name.
    pub fn new(
        prompt_column: impl Into<String>,
        label_column: impl Into<String>,
        exclude: &str,
    ) -> Result<Self> {
        let anchored = format!("^(?:{})", exclude);
        let exclude = Regex::new(&anchored)
            .map_err(|e| Error::config(format!("Invalid column exclusion pattern: {}", e)))?;

        Ok(Self {
            prompt_column: prompt_column.into(),
            label_column: label_column.into(),
            exclude,
        })
    }

    /// Name of the prompt column
    pub fn prompt_column(&self) -> &str {
        &self.prompt_column
    }

    /// Name of the reference label column
    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    /// Pre-judgment output columns, passed through verbatim in clean exports
    pub fn is_initial(column: &str) -> bool {
        column.to_lowercase().ends_with("_initial")
    }

    /// Whether a column is never classified.
    ///
    /// Blank headers are index columns written by dataframe exports.
    pub fn is_excluded(&self, column: &str) -> bool {
        column.trim().is_empty()
            || column == self.prompt_column
            || column == self.label_column
            || Self::is_initial(column)
            || self.exclude.is_match(column)
    }

    /// Columns that hold model outputs, in header order
    pub fn eligible<'h>(&self, headers: &'h csv::StringRecord) -> Vec<&'h str> {
        headers.iter().filter(|c| !self.is_excluded(c)).collect()
    }
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self::new("Prompt1", "Label", DEFAULT_EXCLUDE_COLUMNS)
            .expect("Failed to compile default column rules")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let rules = ColumnRules::default();

        assert!(rules.is_excluded("Prompt1"));
        assert!(rules.is_excluded("Label"));
        assert!(rules.is_excluded("Unnamed: 1"));
        assert!(rules.is_excluded("LLaMA_Initial"));
        assert!(rules.is_excluded("gemma_initial"));
        assert!(!rules.is_excluded("LLaMA_Final"));
        assert!(!rules.is_excluded("Gemma_Considered"));
    }

    #[test]
    fn test_exclusion_is_anchored_at_start() {
        let rules = ColumnRules::new("Prompt", "Gold", "Notes").unwrap();

        assert!(rules.is_excluded("Notes"));
        assert!(rules.is_excluded("Notes_2"));
        assert!(!rules.is_excluded("Reviewer_Notes"));
    }

    #[test]
    fn test_initial_columns_always_excluded() {
        let rules = ColumnRules::new("Prompt", "Gold", "$^").unwrap();
        assert!(rules.is_excluded("Claude_INITIAL"));
        assert!(ColumnRules::is_initial("x_Initial"));
        assert!(!ColumnRules::is_initial("Initial_x"));
    }

    #[test]
    fn test_eligible_columns_keep_header_order() {
        let rules = ColumnRules::default();
        let headers = csv::StringRecord::from(vec![
            "Prompt1",
            "Label",
            "LLaMA_Initial",
            "LLaMA_Final",
            "Gemma_Final",
        ]);
        assert_eq!(rules.eligible(&headers), vec!["LLaMA_Final", "Gemma_Final"]);
    }

    #[test]
    fn test_blank_index_column_excluded() {
        let rules = ColumnRules::new("Prompt", "Gold", "$^").unwrap();
        assert!(rules.is_excluded(""));
        assert!(rules.is_excluded("  "));

        let headers = csv::StringRecord::from(vec!["", "Prompt", "Gold", "X_Final"]);
        assert_eq!(rules.eligible(&headers), vec!["X_Final"]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            ColumnRules::new("Prompt", "Label", "(unclosed"),
            Err(Error::Config(_))
        ));
    }
}
