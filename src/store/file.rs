//! JSON record file.

use crate::records::{RecordTable, VitalRecord};
use std::path::{Path, PathBuf};

/// Record file on disk.
#[derive(Debug, Clone)]
pub struct VitalsStore {
    path: PathBuf,
}

impl VitalsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record table.
    ///
    /// A missing file is created empty. Records are sorted by timestamp on
    /// the way in, so a hand-edited file in any order still loads.
    pub fn load(&self) -> Result<RecordTable, StoreError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "creating empty record file");
            self.save(&RecordTable::new())?;
            return Ok(RecordTable::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<VitalRecord> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let table = RecordTable::from_records(records);
        tracing::info!(path = %self.path.display(), records = table.len(), "records loaded");
        Ok(table)
    }

    /// Write the table.
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so a failed write leaves the previous file intact.
    pub fn save(&self, table: &RecordTable) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(table).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        tracing::info!(path = %self.path.display(), records = table.len(), "records saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Record file errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed record file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
