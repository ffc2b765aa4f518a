//! Debug and clean CSV exports

use crate::columns::ColumnRules;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use verdict_core::{ClassificationUnit, DecisionCase, Error, Label, Result};

/// Header of the debug export: unit attributes in declaration order, then `correct`
pub const DEBUG_HEADER: [&str; 11] = [
    "prompt",
    "reference_label",
    "raw_output",
    "manual_label",
    "automatic_label",
    "case",
    "source_file",
    "source_column",
    "source_line",
    "id",
    "correct",
];

/// One row of the debug export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugRecord {
    pub prompt: String,
    pub reference_label: String,
    pub raw_output: String,
    pub manual_label: Option<Label>,
    pub automatic_label: Option<Label>,
    pub case: Option<DecisionCase>,
    pub source_file: Option<String>,
    pub source_column: Option<String>,
    pub source_line: Option<u64>,
    pub id: String,
    pub correct: bool,
}

impl From<&ClassificationUnit> for DebugRecord {
    fn from(unit: &ClassificationUnit) -> Self {
        Self {
            prompt: unit.prompt.clone(),
            reference_label: unit.reference_label.clone(),
            raw_output: unit.raw_output.clone(),
            manual_label: unit.manual_label,
            automatic_label: unit.automatic_label,
            case: unit.case,
            source_file: unit.source_file.clone(),
            source_column: unit.source_column.clone(),
            source_line: unit.source_line,
            id: unit.id.clone(),
            correct: unit.is_correct(),
        }
    }
}

impl From<DebugRecord> for ClassificationUnit {
    fn from(record: DebugRecord) -> Self {
        Self {
            prompt: record.prompt,
            reference_label: record.reference_label,
            raw_output: record.raw_output,
            manual_label: record.manual_label,
            automatic_label: record.automatic_label,
            case: record.case,
            source_file: record.source_file,
            source_column: record.source_column,
            source_line: record.source_line,
            id: record.id,
        }
    }
}

/// Write every unit, plus its correctness flag, to `path`
pub fn write_debug_csv(path: impl AsRef<Path>, units: &[ClassificationUnit]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(DEBUG_HEADER)?;
    for unit in units {
        writer.serialize(DebugRecord::from(unit))?;
    }
    writer.flush()?;

    info!(path = %path.display(), units = units.len(), "wrote debug export");
    Ok(())
}

/// Read a debug export back into units
pub fn read_debug_csv(path: impl AsRef<Path>) -> Result<Vec<ClassificationUnit>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    reader
        .deserialize::<DebugRecord>()
        .map(|record| Ok(ClassificationUnit::from(record?)))
        .collect()
}

/// Clean export path for a raw file: `<stem><suffix>.csv` beside it
pub fn clean_path(raw: &Path, suffix: &str) -> PathBuf {
    let stem = raw
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    raw.with_file_name(format!("{}{}.csv", stem, suffix))
}

/// Rebuild each raw file with judged cells replaced by their labels.
///
/// Units are grouped by source file, then by prompt; every row sharing a
/// prompt reads from the same group. Initial columns pass through verbatim
/// and excluded columns are dropped. All files are rebuilt in memory first,
/// so a missing unit aborts before anything is written.
pub fn write_clean_csvs(
    units: &[ClassificationUnit],
    columns: &ColumnRules,
    suffix: &str,
) -> Result<Vec<PathBuf>> {
    let mut by_file: BTreeMap<&str, HashMap<&str, Vec<&ClassificationUnit>>> = BTreeMap::new();
    for unit in units {
        let file = unit.source_file.as_deref().ok_or_else(|| {
            Error::data_integrity(format!("unit {} has no source file", unit.id))
        })?;
        by_file
            .entry(file)
            .or_default()
            .entry(unit.prompt.as_str())
            .or_default()
            .push(unit);
    }

    let mut outputs = Vec::with_capacity(by_file.len());
    for (file, groups) in &by_file {
        let rows = rebuild_clean_table(Path::new(file), groups, columns)?;
        outputs.push((clean_path(Path::new(file), suffix), rows));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (path, rows) in outputs {
        let mut writer = csv::Writer::from_path(&path)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = rows.len().saturating_sub(1), "wrote clean export");
        written.push(path);
    }

    Ok(written)
}

fn rebuild_clean_table(
    raw_path: &Path,
    groups: &HashMap<&str, Vec<&ClassificationUnit>>,
    columns: &ColumnRules,
) -> Result<Vec<Vec<String>>> {
    let source = raw_path.display().to_string();
    let mut reader = csv::Reader::from_path(raw_path)?;
    let headers = reader.headers()?.clone();

    let position = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            Error::data_integrity(format!("{}: missing required column {:?}", source, name))
        })
    };
    let prompt_idx = position(columns.prompt_column())?;
    let label_idx = position(columns.label_column())?;

    let outputs: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, name)| {
            *i != prompt_idx
                && *i != label_idx
                && (ColumnRules::is_initial(name) || !columns.is_excluded(name))
        })
        .collect();

    let mut rows = Vec::new();
    let mut header_row = vec![
        columns.prompt_column().to_string(),
        columns.label_column().to_string(),
    ];
    header_row.extend(outputs.iter().map(|(_, name)| name.to_string()));
    rows.push(header_row);

    for record in reader.records() {
        let record = record?;
        let prompt = record.get(prompt_idx).unwrap_or("");
        let group = groups.get(prompt).map(Vec::as_slice).unwrap_or(&[]);

        let mut row = vec![
            prompt.to_string(),
            record.get(label_idx).unwrap_or("").to_string(),
        ];
        for (idx, column) in &outputs {
            if ColumnRules::is_initial(column) {
                row.push(record.get(*idx).unwrap_or("").to_string());
                continue;
            }

            let unit = group
                .iter()
                .find(|u| u.source_column.as_deref() == Some(*column))
                .ok_or_else(|| {
                    error!(source = %source, column = %column, "clean export column not found");
                    Error::data_integrity(format!(
                        "{}: no classified unit for column {:?} of prompt {:?}",
                        source, column, prompt
                    ))
                })?;
            row.push(unit.automatic_label.unwrap_or(Label::Unsure).as_str().to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(
            clean_path(Path::new("data/run_raw.csv"), "_clean_gen"),
            PathBuf::from("data/run_raw_clean_gen.csv")
        );
        assert_eq!(
            clean_path(Path::new("run.csv"), "_clean"),
            PathBuf::from("run_clean.csv")
        );
    }

    #[test]
    fn test_debug_record_carries_correctness() {
        let unit = ClassificationUnit::new("p", "", "Response A")
            .with_manual_label(Label::A)
            .with_verdict(Label::A, DecisionCase::ExactPrefix);
        assert!(DebugRecord::from(&unit).correct);

        let unit = unit.with_verdict(Label::Unsure, DecisionCase::Deferred);
        assert!(!DebugRecord::from(&unit).correct);
    }

    #[test]
    fn test_debug_header_matches_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.csv");
        let unit = ClassificationUnit::new("p", "Response B", "text")
            .with_provenance("run.csv", "X_Final", 2)
            .with_verdict(Label::Unsure, DecisionCase::Deferred);

        write_debug_csv(&path, &[unit.clone()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, DEBUG_HEADER.to_vec());

        let back = read_debug_csv(&path).unwrap();
        assert_eq!(back, vec![unit]);
    }

    #[test]
    fn test_empty_debug_export_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.csv");

        write_debug_csv(&path, &[]).unwrap();
        assert!(read_debug_csv(&path).unwrap().is_empty());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("prompt,reference_label,raw_output"));
    }
}
