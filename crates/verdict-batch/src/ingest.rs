//! Building classification units from raw and reference CSV tables

use crate::columns::ColumnRules;
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use verdict_classifiers::resolve;
use verdict_core::{ClassificationUnit, Error, Result};

/// Line number of the first data row (the header is line 1)
const FIRST_DATA_LINE: u64 = 2;

/// A CSV table with a header index
struct Table {
    source: String,
    headers: StringRecord,
    index: HashMap<String, usize>,
    reader: csv::Reader<std::fs::File>,
}

impl Table {
    fn open(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        Ok(Self {
            source: path.display().to_string(),
            headers,
            index,
            reader,
        })
    }

    fn require(&self, column: &str) -> Result<usize> {
        self.index.get(column).copied().ok_or_else(|| {
            Error::data_integrity(format!("{}: missing required column {:?}", self.source, column))
        })
    }
}

fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or("")
}

/// Build units from raw tables alone.
///
/// One unit per (row, eligible column). Manual labels are absent; the
/// reference column is carried as the unit's reference label.
pub fn load_raw_files<P: AsRef<Path>>(
    paths: &[P],
    columns: &ColumnRules,
) -> Result<Vec<ClassificationUnit>> {
    let mut units = Vec::new();

    for path in paths {
        let mut table = Table::open(path.as_ref())?;
        let prompt_idx = table.require(columns.prompt_column())?;
        let label_idx = table.require(columns.label_column())?;
        let eligible: Vec<(String, usize)> = columns
            .eligible(&table.headers)
            .into_iter()
            .map(|c| (c.to_string(), table.index[c]))
            .collect();

        let before = units.len();
        let mut line = FIRST_DATA_LINE;
        for record in table.reader.records() {
            let record = record?;
            let prompt = cell(&record, prompt_idx);
            let reference = cell(&record, label_idx);

            for (column, idx) in &eligible {
                units.push(
                    ClassificationUnit::new(prompt, reference, cell(&record, *idx))
                        .with_provenance(&table.source, column, line),
                );
            }
            line += 1;
        }

        info!(
            source = %table.source,
            units = units.len() - before,
            columns = eligible.len(),
            "loaded raw table"
        );
    }

    Ok(units)
}

/// Build units from raw tables paired row-for-row with reference tables.
///
/// Each reference cell must resolve to a label and becomes the unit's manual
/// label; it is never shown to the classifier. Any disagreement between the
/// two tables (prompt, columns, row count) aborts the load.
pub fn load_paired_files<P: AsRef<Path>, Q: AsRef<Path>>(
    pairs: &[(P, Q)],
    columns: &ColumnRules,
) -> Result<Vec<ClassificationUnit>> {
    let mut units = Vec::new();

    for (raw_path, clean_path) in pairs {
        let mut raw = Table::open(raw_path.as_ref())?;
        let mut clean = Table::open(clean_path.as_ref())?;
        let raw_prompt = raw.require(columns.prompt_column())?;
        let clean_prompt = clean.require(columns.prompt_column())?;

        // Union of both headers, raw order first
        let mut eligible: Vec<&str> = columns.eligible(&raw.headers);
        for column in columns.eligible(&clean.headers) {
            if !eligible.contains(&column) {
                eligible.push(column);
            }
        }
        let mut paired_columns = Vec::with_capacity(eligible.len());
        for column in eligible {
            let raw_idx = raw.index.get(column).copied();
            let clean_idx = clean.index.get(column).copied();
            match (raw_idx, clean_idx) {
                (Some(r), Some(c)) => paired_columns.push((column.to_string(), r, c)),
                (None, _) => {
                    return Err(Error::data_integrity(format!(
                        "column {:?} is in {} but not in {}",
                        column, clean.source, raw.source
                    )))
                }
                (_, None) => {
                    return Err(Error::data_integrity(format!(
                        "column {:?} is in {} but not in {}",
                        column, raw.source, clean.source
                    )))
                }
            }
        }

        let before = units.len();
        let mut raw_records = raw.reader.records();
        let mut clean_records = clean.reader.records();
        let mut line = FIRST_DATA_LINE;
        loop {
            let (raw_record, clean_record) = match (raw_records.next(), clean_records.next()) {
                (None, None) => break,
                (Some(r), Some(c)) => (r?, c?),
                _ => {
                    return Err(Error::data_integrity(format!(
                        "{} and {} have different row counts (diverge at line {})",
                        raw.source, clean.source, line
                    )))
                }
            };

            let prompt = cell(&raw_record, raw_prompt);
            if prompt != cell(&clean_record, clean_prompt) {
                return Err(Error::data_integrity(format!(
                    "prompt mismatch between {} and {} at line {}",
                    raw.source, clean.source, line
                )));
            }

            for (column, raw_idx, clean_idx) in &paired_columns {
                let reference = cell(&clean_record, *clean_idx);
                let manual = resolve(reference).map_err(|e| {
                    Error::data_integrity(format!(
                        "{} line {} column {:?}: {}",
                        clean.source, line, column, e
                    ))
                })?;

                units.push(
                    ClassificationUnit::new(prompt, "", cell(&raw_record, *raw_idx))
                        .with_provenance(&raw.source, column, line)
                        .with_manual_label(manual),
                );
            }
            line += 1;
        }

        debug!(raw = %raw.source, clean = %clean.source, "paired tables agree");
        info!(
            source = %raw.source,
            units = units.len() - before,
            columns = paired_columns.len(),
            "loaded paired tables"
        );
    }

    Ok(units)
}
