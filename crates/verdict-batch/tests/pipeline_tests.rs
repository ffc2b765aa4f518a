//! Raw tables through classification, exports and evaluation

use std::path::{Path, PathBuf};
use verdict_batch::{
    clean_path, read_debug_csv, write_clean_csvs, write_debug_csv, BatchRunner, ColumnRules,
    EvaluationReport,
};
use verdict_classifiers::{PatternCatalog, PatternTemplate, VerdictEngine};
use verdict_core::{ClassificationUnit, DecisionCase, Error, Label};

const RAW: &str = "Prompt1,Label,LLaMA_Initial,LLaMA_Final,Gemma_Final\n\
q1,Response A,thinking,Response A,I choose Response B\n\
q2,Response B,hmm,Both are fine,Response B\n";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn runner() -> BatchRunner<VerdictEngine> {
    BatchRunner::new(VerdictEngine::default(), ColumnRules::default())
}

#[test]
fn test_raw_run_and_clean_export() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(dir.path(), "run.csv", RAW);

    let units = runner().run_raw(&[&raw]).unwrap();
    let labels: Vec<_> = units.iter().map(|u| u.automatic_label).collect();
    assert_eq!(
        labels,
        vec![Some(Label::A), Some(Label::B), Some(Label::Unsure), Some(Label::B)]
    );
    assert_eq!(units[1].case, Some(DecisionCase::Voting));
    assert_eq!(units[2].case, Some(DecisionCase::Deferred));

    let written = write_clean_csvs(&units, &ColumnRules::default(), "_clean_gen").unwrap();
    assert_eq!(written, vec![clean_path(&raw, "_clean_gen")]);

    let content = std::fs::read_to_string(&written[0]).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "Prompt1,Label,LLaMA_Initial,LLaMA_Final,Gemma_Final");
    assert_eq!(lines[1], "q1,Response A,thinking,Response A,Response B");
    assert_eq!(lines[2], "q2,Response B,hmm,UNSURE,Response B");
}

#[test]
fn test_clean_export_drops_excluded_columns() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(
        dir.path(),
        "run.csv",
        "Prompt1,Label,Unnamed: 1,X_Initial,X_Final\nq1,Response A,junk,first,Response A\n",
    );

    let units = runner().run_raw(&[&raw]).unwrap();
    assert_eq!(units.len(), 1);

    let written = write_clean_csvs(&units, &ColumnRules::default(), "_clean").unwrap();
    let content = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(
        content,
        "Prompt1,Label,X_Initial,X_Final\nq1,Response A,first,Response A\n"
    );
}

#[test]
fn test_clean_export_missing_unit_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(dir.path(), "run.csv", RAW);

    let units: Vec<_> = runner()
        .run_raw(&[&raw])
        .unwrap()
        .into_iter()
        .filter(|u| u.source_column.as_deref() != Some("Gemma_Final"))
        .collect();

    let result = write_clean_csvs(&units, &ColumnRules::default(), "_clean_gen");
    assert!(matches!(result, Err(Error::DataIntegrity(_))));
    assert!(!clean_path(&raw, "_clean_gen").exists());
}

#[test]
fn test_paired_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(dir.path(), "run.csv", RAW);
    let clean = write(
        dir.path(),
        "run_clean.csv",
        "Prompt1,Label,LLaMA_Initial,LLaMA_Final,Gemma_Final\n\
         q1,Response A,thinking,Response A,Response B\n\
         q2,Response B,hmm,Response A,Response B\n",
    );

    let units = runner().run_paired(&[(&raw, &clean)]).unwrap();
    let report = EvaluationReport::from_units(&units);

    assert_eq!(report.total, 4);
    assert_eq!(report.correct, 3);
    assert_eq!(report.unsure, 1);
    assert_eq!(report.confidently_wrong, 0);
    assert_eq!(report.per_case, [2, 1, 1]);
    assert_eq!(report.per_source.len(), 1);
    assert_eq!(report.per_source[0].file, raw.display().to_string());
}

#[test]
fn test_debug_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(dir.path(), "run.csv", RAW);
    let debug = dir.path().join("classification_attempts.csv");

    let units = runner().run_raw(&[&raw]).unwrap();
    write_debug_csv(&debug, &units).unwrap();

    let back = read_debug_csv(&debug).unwrap();
    assert_eq!(back, units);
}

#[test]
fn test_blank_index_column_is_not_classified() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write(
        dir.path(),
        "indexed.csv",
        ",Prompt1,Label,X_Final\n0,q1,Response A,Response B\n",
    );
    let debug = dir.path().join("classification_attempts.csv");

    let units = runner().run_raw(&[&raw]).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].source_column.as_deref(), Some("X_Final"));

    write_debug_csv(&debug, &units).unwrap();
    assert_eq!(read_debug_csv(&debug).unwrap(), units);

    let written = write_clean_csvs(&units, &ColumnRules::default(), "_clean_gen").unwrap();
    let content = std::fs::read_to_string(&written[0]).unwrap();
    assert_eq!(content, "Prompt1,Label,X_Final\nq1,Response A,Response B\n");
}

#[test]
fn test_unrecognized_token_aborts_batch() {
    let misplaced = [PatternTemplate::standard(r"ichooseresponse(a|b)", 3)];
    let catalog = PatternCatalog::from_templates(&misplaced, &[]).unwrap();
    let runner = BatchRunner::new(VerdictEngine::with_catalog(catalog), ColumnRules::default());

    let units = vec![
        ClassificationUnit::new("q1", "", "Response A"),
        ClassificationUnit::new("q2", "", "I choose Response A"),
    ];
    assert!(matches!(
        runner.classify_all(units),
        Err(Error::UnrecognizedLabelToken(_))
    ));
}
