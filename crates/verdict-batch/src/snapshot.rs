//! Review progress snapshots
//!
//! A snapshot holds every unit of a review batch plus the position of the
//! next unit to present, so an interrupted review resumes where it stopped.
//! Files are pretty-printed JSON, written to a sibling temp file and renamed
//! into place so a crash mid-write never leaves a truncated snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use verdict_core::{ClassificationUnit, Error, Result};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Saved state of a review session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Format version
    pub version: u32,

    /// When the snapshot was written
    pub saved_at: DateTime<Utc>,

    /// Index of the next unit to present
    pub cursor: usize,

    /// Every unit in the batch, reviewed or not
    pub units: Vec<ClassificationUnit>,
}

impl ProgressSnapshot {
    pub fn new(cursor: usize, units: Vec<ClassificationUnit>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            cursor,
            units,
        }
    }
}

/// File-backed snapshot storage
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a non-empty snapshot file exists
    pub fn exists(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    pub fn load(&self) -> Result<ProgressSnapshot> {
        let file = File::open(&self.path)?;
        let snapshot: ProgressSnapshot = serde_json::from_reader(BufReader::new(file))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::data_integrity(format!(
                "{}: unsupported snapshot version {} (expected {})",
                self.path.display(),
                snapshot.version,
                SNAPSHOT_VERSION
            )));
        }
        if snapshot.cursor > snapshot.units.len() {
            return Err(Error::data_integrity(format!(
                "{}: cursor {} past end of {} units",
                self.path.display(),
                snapshot.cursor,
                snapshot.units.len()
            )));
        }

        info!(
            path = %self.path.display(),
            saved_at = %snapshot.saved_at,
            cursor = snapshot.cursor,
            units = snapshot.units.len(),
            "loaded review progress"
        );
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
            writer.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), cursor = snapshot.cursor, "saved review progress");
        Ok(())
    }

    /// Remove the snapshot file; a missing file is not an error
    pub fn discard(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "discarded review progress");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
