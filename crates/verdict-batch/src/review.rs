//! Resumable human review of deferred units

use crate::snapshot::{ProgressSnapshot, SnapshotStore};
use tracing::info;
use verdict_core::{ClassificationUnit, Label, Result};

/// A reviewer's answer for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    A,
    B,
    /// Leave the unit `Unsure` and move on
    Defer,
    /// Stop reviewing; progress is kept
    Abort,
}

/// Presents one unit to a human and waits for a decision.
///
/// Implementations block until the human answers.
pub trait Reviewer {
    fn present(&mut self, unit: &ClassificationUnit) -> Result<Decision>;
}

/// How a review pass ended
#[derive(Debug)]
pub enum ReviewOutcome {
    /// Every deferred unit was presented
    Completed(Vec<ClassificationUnit>),
    /// The reviewer aborted; the snapshot holds the progress
    Suspended { reviewed: usize, remaining: usize },
}

/// A batch of units under review, persisted after every decision
pub struct ReviewSession {
    units: Vec<ClassificationUnit>,
    cursor: usize,
    store: SnapshotStore,
}

impl ReviewSession {
    /// Start reviewing a freshly classified batch
    pub fn new(units: Vec<ClassificationUnit>, store: SnapshotStore) -> Self {
        Self {
            units,
            cursor: 0,
            store,
        }
    }

    /// Resume from a stored snapshot, if one exists
    pub fn resume(store: SnapshotStore) -> Result<Option<Self>> {
        if !store.exists() {
            return Ok(None);
        }
        let snapshot = store.load()?;
        Ok(Some(Self {
            units: snapshot.units,
            cursor: snapshot.cursor,
            store,
        }))
    }

    pub fn units(&self) -> &[ClassificationUnit] {
        &self.units
    }

    /// Units from the cursor onward still awaiting a human
    pub fn pending(&self) -> usize {
        self.units[self.cursor..]
            .iter()
            .filter(|u| u.needs_review())
            .count()
    }

    /// Present every remaining deferred unit to `reviewer`.
    ///
    /// The snapshot is saved after each decision, abort included. On
    /// completion the snapshot is left in place: the caller discards it once
    /// the exports are written.
    pub fn run<R: Reviewer + ?Sized>(mut self, reviewer: &mut R) -> Result<ReviewOutcome> {
        let total = self.pending();
        info!(pending = total, units = self.units.len(), "starting manual review");

        let mut reviewed = 0;
        while self.cursor < self.units.len() {
            if !self.units[self.cursor].needs_review() {
                self.cursor += 1;
                continue;
            }

            let decision = reviewer.present(&self.units[self.cursor])?;
            let unit = &mut self.units[self.cursor];
            match decision {
                Decision::A | Decision::B => {
                    let label = if decision == Decision::A { Label::A } else { Label::B };
                    *unit = unit.clone().with_human_decision(label);
                    info!(id = %unit.id, label = %label, "manually classified");
                }
                Decision::Defer => {
                    info!(id = %unit.id, "left as unsure");
                }
                Decision::Abort => {
                    self.save()?;
                    info!(reviewed, remaining = total - reviewed, "review suspended");
                    return Ok(ReviewOutcome::Suspended {
                        reviewed,
                        remaining: total - reviewed,
                    });
                }
            }

            self.cursor += 1;
            reviewed += 1;
            self.save()?;
        }

        info!(reviewed, "manual review complete");
        Ok(ReviewOutcome::Completed(self.units))
    }

    fn save(&self) -> Result<()> {
        self.store
            .save(&ProgressSnapshot::new(self.cursor, self.units.clone()))
    }
}
