//! Verdict configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use verdict_batch::{ColumnRules, DEFAULT_EXCLUDE_COLUMNS};
use verdict_collect::CollectConfig;

/// Verdict configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerdictConfig {
    /// Column holding the prompt
    #[serde(default = "default_prompt_column")]
    pub prompt_column: String,

    /// Column holding the reference label
    #[serde(default = "default_label_column")]
    pub label_column: String,

    /// Columns matching this pattern are never classified
    #[serde(default = "default_exclude_columns")]
    pub exclude_columns: String,

    /// Debug export path
    #[serde(default = "default_debug_export")]
    pub debug_export: PathBuf,

    /// Suffix appended to raw file stems for clean exports
    #[serde(default = "default_clean_suffix")]
    pub clean_suffix: String,

    /// Manual review progress file
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Append-only debug log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// DUET collection settings
    #[serde(default)]
    pub collect: CollectConfig,
}

impl VerdictConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(column) = &cli.prompt_column {
            config.prompt_column = column.clone();
        }

        if let Some(column) = &cli.label_column {
            config.label_column = column.clone();
        }

        if let Some(pattern) = &cli.exclude_columns {
            config.exclude_columns = pattern.clone();
        }

        if let Some(path) = &cli.debug_export {
            config.debug_export = path.clone();
        }

        if let Some(path) = &cli.log_file {
            config.log_file = path.clone();
        }

        if let Some(path) = &cli.snapshot {
            config.snapshot_path = path.clone();
        }

        Ok(config)
    }

    /// Column rules for ingestion and clean exports
    pub fn column_rules(&self) -> verdict_core::Result<ColumnRules> {
        ColumnRules::new(&self.prompt_column, &self.label_column, &self.exclude_columns)
    }
}

impl Default for VerdictConfig {
    fn default() -> Self {
        Self {
            prompt_column: default_prompt_column(),
            label_column: default_label_column(),
            exclude_columns: default_exclude_columns(),
            debug_export: default_debug_export(),
            clean_suffix: default_clean_suffix(),
            snapshot_path: default_snapshot_path(),
            log_file: default_log_file(),
            collect: CollectConfig::default(),
        }
    }
}

fn default_prompt_column() -> String {
    "Prompt1".to_string()
}

fn default_label_column() -> String {
    "Label".to_string()
}

fn default_exclude_columns() -> String {
    DEFAULT_EXCLUDE_COLUMNS.to_string()
}

fn default_debug_export() -> PathBuf {
    PathBuf::from("classification_attempts.csv")
}

fn default_clean_suffix() -> String {
    "_clean_gen".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("manual_classification_progress.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("verdict.log")
}
