//! Verdict Batch
//!
//! Orchestration around the classification engine:
//! - Building classification units from raw (and optionally reference) CSVs
//! - Running the engine over every unit
//! - Debug and clean exports
//! - Evaluation reports (accuracy, per-source accuracy, per-case proportions)
//! - Resumable manual review of deferred units

pub mod columns;
pub mod export;
pub mod ingest;
pub mod report;
pub mod review;
pub mod runner;
pub mod snapshot;

pub use columns::{ColumnRules, DEFAULT_EXCLUDE_COLUMNS};
pub use export::{clean_path, read_debug_csv, write_clean_csvs, write_debug_csv, DebugRecord};
pub use ingest::{load_paired_files, load_raw_files};
pub use report::{EvaluationReport, SourceAccuracy};
pub use review::{Decision, ReviewOutcome, ReviewSession, Reviewer};
pub use runner::BatchRunner;
pub use snapshot::{ProgressSnapshot, SnapshotStore};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::columns::ColumnRules;
    pub use crate::report::EvaluationReport;
    pub use crate::review::{Decision, ReviewOutcome, ReviewSession, Reviewer};
    pub use crate::runner::BatchRunner;
    pub use crate::snapshot::SnapshotStore;
}
