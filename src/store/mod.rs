//! Record persistence and staged editing.
//!
//! The record file is read once at startup and written back only after a
//! change has been validated and committed.

pub mod file;
pub mod staging;

// Re-export commonly used types
pub use file::{StoreError, VitalsStore};
pub use staging::{RecordPatch, Session, StageError, StagedTable};
