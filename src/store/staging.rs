//! Staged changes to the record table.
//!
//! Every change runs against a scratch copy of the committed table. The copy
//! replaces the committed table only if the whole change succeeds; on any
//! error it is dropped and the committed table is left as it was.

use crate::core::search::find_timestamp;
use crate::records::{
    validate_reading, ReadingDraft, RecordTable, ValidationError, VitalField, VitalRecord,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The committed table plus the table as it was first loaded.
#[derive(Debug, Clone)]
pub struct Session {
    committed: RecordTable,
    baseline: RecordTable,
}

impl Session {
    pub fn new(table: RecordTable) -> Self {
        Self {
            baseline: table.clone(),
            committed: table,
        }
    }

    /// The committed table.
    pub fn table(&self) -> &RecordTable {
        &self.committed
    }

    /// Run `change` against a scratch copy and commit it on success.
    pub fn apply<T, F>(&mut self, change: F) -> Result<T, StageError>
    where
        F: FnOnce(&mut StagedTable) -> Result<T, StageError>,
    {
        let mut staged = StagedTable {
            table: self.committed.clone(),
        };

        match change(&mut staged) {
            Ok(value) => {
                tracing::info!(records = staged.table.len(), "change committed");
                self.committed = staged.table;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "change discarded");
                Err(e)
            }
        }
    }

    /// Throw away every committed change since the session started.
    pub fn undo_all(&mut self) {
        self.committed = self.baseline.clone();
        tracing::info!("all changes undone");
    }

    /// Check if the committed table differs from the one loaded.
    pub fn is_modified(&self) -> bool {
        self.committed != self.baseline
    }

    pub fn into_table(self) -> RecordTable {
        self.committed
    }
}

/// Scratch copy of the table handed to [`Session::apply`].
#[derive(Debug)]
pub struct StagedTable {
    table: RecordTable,
}

impl StagedTable {
    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    /// Index of the record taken at exactly `timestamp`.
    pub fn index_of(&self, timestamp: NaiveDateTime) -> Result<usize, StageError> {
        find_timestamp(&self.table, timestamp).ok_or(StageError::NoRecordAt(timestamp))
    }

    /// Validate and insert a new record. Returns its index.
    pub fn add(
        &mut self,
        timestamp: NaiveDateTime,
        draft: &ReadingDraft,
    ) -> Result<usize, StageError> {
        let reading = validate_reading(draft)?;
        if find_timestamp(&self.table, timestamp).is_some() {
            return Err(StageError::Duplicate(timestamp));
        }
        Ok(self.table.insert_sorted(VitalRecord::new(timestamp, reading)))
    }

    /// Merge `patch` into the record at `index`. Returns its new index.
    ///
    /// The merged record is validated as a whole, and moving it onto the
    /// timestamp of another record is rejected.
    pub fn edit(&mut self, index: usize, patch: &RecordPatch) -> Result<usize, StageError> {
        let current = self.table.get(index).ok_or(StageError::NotFound(index))?;

        let reading = validate_reading(&patch.merge(ReadingDraft::from(current.reading)))?;
        let timestamp = patch.timestamp.unwrap_or(current.timestamp);
        if timestamp != current.timestamp && find_timestamp(&self.table, timestamp).is_some() {
            return Err(StageError::Duplicate(timestamp));
        }

        self.table.remove(index);
        Ok(self.table.insert_sorted(VitalRecord::new(timestamp, reading)))
    }

    /// Remove and return the record at `index`.
    pub fn remove(&mut self, index: usize) -> Result<VitalRecord, StageError> {
        self.table.remove(index).ok_or(StageError::NotFound(index))
    }
}

/// Changes to apply to an existing record. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub timestamp: Option<NaiveDateTime>,
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
    pub pulse: Option<u32>,
    pub glucose: Option<f64>,
    /// Readings to drop from the record. A new value for the same field
    /// still applies.
    #[serde(default)]
    pub clear: Vec<VitalField>,
}

impl RecordPatch {
    fn merge(&self, mut base: ReadingDraft) -> ReadingDraft {
        for field in &self.clear {
            match field {
                VitalField::Systolic => base.systolic = None,
                VitalField::Diastolic => base.diastolic = None,
                VitalField::Pulse => base.pulse = None,
                VitalField::Glucose => base.glucose = None,
            }
        }

        ReadingDraft {
            systolic: self.systolic.or(base.systolic),
            diastolic: self.diastolic.or(base.diastolic),
            pulse: self.pulse.or(base.pulse),
            glucose: self.glucose.or(base.glucose),
        }
    }
}

/// Why a staged change was discarded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a record already exists at {0}")]
    Duplicate(NaiveDateTime),
    #[error("no record at index {0}")]
    NotFound(usize),
    #[error("no record at {0}")]
    NoRecordAt(NaiveDateTime),
}
