//! Evaluation reports over judged units

use serde::Serialize;
use std::fmt;
use verdict_core::{ClassificationUnit, DecisionCase, Label};

/// Accuracy for one originating file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceAccuracy {
    pub file: String,
    pub total: usize,
    pub correct: usize,
}

impl SourceAccuracy {
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }
}

/// Summary of a batch run against known-correct labels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Units classified
    pub total: usize,

    /// Units whose automatic label matches the manual one
    pub correct: usize,

    /// Units left `Unsure` (counted as incorrect)
    pub unsure: usize,

    /// Units with a concrete automatic label contradicting the manual one
    pub confidently_wrong: usize,

    /// Per-file accuracy, in order of first appearance
    pub per_source: Vec<SourceAccuracy>,

    /// Unit count per decision case, indexed by case
    pub per_case: [usize; DecisionCase::COUNT],
}

impl EvaluationReport {
    pub fn from_units(units: &[ClassificationUnit]) -> Self {
        let mut report = Self {
            total: units.len(),
            correct: 0,
            unsure: 0,
            confidently_wrong: 0,
            per_source: Vec::new(),
            per_case: [0; DecisionCase::COUNT],
        };

        for unit in units {
            let correct = unit.is_correct();
            if correct {
                report.correct += 1;
            }
            if unit.automatic_label == Some(Label::Unsure) {
                report.unsure += 1;
            }
            if unit.is_confidently_wrong() {
                report.confidently_wrong += 1;
            }
            if let Some(case) = unit.case {
                report.per_case[case.index() as usize] += 1;
            }

            let file = unit.source_file.as_deref().unwrap_or("<unknown>");
            let entry = match report.per_source.iter_mut().position(|s| s.file == file) {
                Some(i) => &mut report.per_source[i],
                None => {
                    report.per_source.push(SourceAccuracy {
                        file: file.to_string(),
                        total: 0,
                        correct: 0,
                    });
                    let last = report.per_source.len() - 1;
                    &mut report.per_source[last]
                }
            };
            entry.total += 1;
            if correct {
                entry.correct += 1;
            }
        }

        report
    }

    /// Overall accuracy in `[0, 1]`; 0 for an empty batch
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct, self.total)
    }

    /// Share of units left for manual review
    pub fn unsure_rate(&self) -> f64 {
        ratio(self.unsure, self.total)
    }

    /// Share of units decided by `case`
    pub fn case_proportion(&self, case: DecisionCase) -> f64 {
        ratio(self.per_case[case.index() as usize], self.total)
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total LLM outputs classified: {}", self.total)?;
        writeln!(
            f,
            "Overall accuracy: {:.1}% (including as incorrect the {:.1}% marked to be manually classified)",
            self.accuracy() * 100.0,
            self.unsure_rate() * 100.0
        )?;
        writeln!(f, "Confidently wrong: {}", self.confidently_wrong)?;

        writeln!(f)?;
        writeln!(f, "--------------- ACCURACY BY INPUT FILE ----------------")?;
        for source in &self.per_source {
            writeln!(f, "Accuracy for {}: {:.1}%", source.file, source.accuracy() * 100.0)?;
        }

        writeln!(f)?;
        writeln!(f, "------ PROPORTION CLASSIFIED BY CLASSIFIER CASES ------")?;
        for case in DecisionCase::ALL {
            writeln!(
                f,
                "Proportion classified using case {} ({}): {:.1}%",
                case,
                case.as_str(),
                self.case_proportion(case) * 100.0
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(file: &str, manual: Label, automatic: Label, case: DecisionCase) -> ClassificationUnit {
        ClassificationUnit::new("p", "", format!("{}{:?}", file, automatic))
            .with_provenance(file, "X_Final", 2)
            .with_manual_label(manual)
            .with_verdict(automatic, case)
    }

    #[test]
    fn test_report_counts() {
        let units = vec![
            unit("a.csv", Label::A, Label::A, DecisionCase::ExactPrefix),
            unit("a.csv", Label::B, Label::Unsure, DecisionCase::Deferred),
            unit("b.csv", Label::B, Label::B, DecisionCase::Voting),
            unit("b.csv", Label::A, Label::B, DecisionCase::Voting),
        ];

        let report = EvaluationReport::from_units(&units);
        assert_eq!(report.total, 4);
        assert_eq!(report.correct, 2);
        assert_eq!(report.unsure, 1);
        assert_eq!(report.confidently_wrong, 1);
        assert_eq!(report.per_case, [1, 2, 1]);
        assert!((report.accuracy() - 0.5).abs() < f64::EPSILON);
        assert!((report.unsure_rate() - 0.25).abs() < f64::EPSILON);
        assert!((report.case_proportion(DecisionCase::Voting) - 0.5).abs() < f64::EPSILON);

        assert_eq!(report.per_source.len(), 2);
        assert_eq!(report.per_source[0].file, "a.csv");
        assert_eq!(report.per_source[0].correct, 1);
        assert_eq!(report.per_source[1].total, 2);
    }

    #[test]
    fn test_empty_report() {
        let report = EvaluationReport::from_units(&[]);
        assert_eq!(report.accuracy(), 0.0);
        assert_eq!(report.unsure_rate(), 0.0);
        assert!(report.per_source.is_empty());
    }

    #[test]
    fn test_report_display() {
        let units = vec![unit("a.csv", Label::A, Label::A, DecisionCase::ExactPrefix)];
        let text = EvaluationReport::from_units(&units).to_string();

        assert!(text.contains("Total LLM outputs classified: 1"));
        assert!(text.contains("Overall accuracy: 100.0%"));
        assert!(text.contains("Accuracy for a.csv: 100.0%"));
        assert!(text.contains("Proportion classified using case 0 (exact_prefix): 100.0%"));
    }
}
