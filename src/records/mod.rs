//! Vital-sign records and the table that holds them.
//!
//! This module contains:
//! - Record and reading types
//! - Match keys for day and month lookups
//! - The timestamp-ordered record table
//! - Reading validation

pub mod key;
pub mod table;
pub mod types;
pub mod validate;

// Re-export commonly used types
pub use key::{Granularity, MatchKey, ParseKeyError};
pub use table::RecordTable;
pub use types::{FieldSelection, Reading, UnknownFieldError, VitalField, VitalRecord};
pub use validate::{validate_reading, ReadingDraft, ValidationError};
