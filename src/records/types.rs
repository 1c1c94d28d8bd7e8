//! Vital-sign record types.
//!
//! A record is one sitting: a timestamp plus whichever readings were taken.
//! Every reading is optional, but a record written through the staging layer
//! always carries at least one.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The readings taken at one sitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Systolic blood pressure (mmHg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic: Option<u32>,
    /// Diastolic blood pressure (mmHg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<u32>,
    /// Pulse rate (beats per minute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<u32>,
    /// Blood glucose level (mmol/L, one decimal place)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
}

impl Reading {
    /// Check if no reading is present at all.
    pub fn is_empty(&self) -> bool {
        self.systolic.is_none()
            && self.diastolic.is_none()
            && self.pulse.is_none()
            && self.glucose.is_none()
    }
}

/// A timestamped vital-sign record.
///
/// Identity is positional: a record is addressed by its index in a
/// [`RecordTable`](crate::records::RecordTable), never by an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    /// When the readings were taken (local wall-clock time)
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub reading: Reading,
}

impl VitalRecord {
    pub fn new(timestamp: NaiveDateTime, reading: Reading) -> Self {
        Self { timestamp, reading }
    }

    /// Get the value of one field as a float, if it was recorded.
    pub fn value(&self, field: VitalField) -> Option<f64> {
        field.value(&self.reading)
    }
}

/// A numeric field that can be aggregated and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    Systolic,
    Diastolic,
    Pulse,
    Glucose,
}

impl VitalField {
    /// Every field, in report order.
    pub const ALL: [VitalField; 4] = [
        VitalField::Systolic,
        VitalField::Diastolic,
        VitalField::Pulse,
        VitalField::Glucose,
    ];

    /// Extract this field from a reading.
    pub fn value(self, reading: &Reading) -> Option<f64> {
        match self {
            VitalField::Systolic => reading.systolic.map(f64::from),
            VitalField::Diastolic => reading.diastolic.map(f64::from),
            VitalField::Pulse => reading.pulse.map(f64::from),
            VitalField::Glucose => reading.glucose,
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            VitalField::Systolic => "Systolic blood pressure",
            VitalField::Diastolic => "Diastolic blood pressure",
            VitalField::Pulse => "Pulse rate",
            VitalField::Glucose => "Blood glucose level",
        }
    }

    /// Unit of measurement.
    pub fn unit(self) -> &'static str {
        match self {
            VitalField::Systolic | VitalField::Diastolic => "mmHg",
            VitalField::Pulse => "bpm",
            VitalField::Glucose => "mmol/L",
        }
    }

    /// Short column name used on the command line and in stored files.
    pub fn column(self) -> &'static str {
        match self {
            VitalField::Systolic => "sys",
            VitalField::Diastolic => "dia",
            VitalField::Pulse => "pulse",
            VitalField::Glucose => "glucose",
        }
    }
}

impl fmt::Display for VitalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Error returned when a field name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vital field '{0}' (expected sys, dia, pulse or glucose)")]
pub struct UnknownFieldError(pub String);

impl FromStr for VitalField {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sys" | "systolic" => Ok(VitalField::Systolic),
            "dia" | "diastolic" => Ok(VitalField::Diastolic),
            "pulse" => Ok(VitalField::Pulse),
            "glucose" => Ok(VitalField::Glucose),
            other => Err(UnknownFieldError(other.to_string())),
        }
    }
}

/// Which fields a report should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<VitalField>,
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self {
            fields: VitalField::ALL.to_vec(),
        }
    }
}

impl FieldSelection {
    /// Parse a selection from a comma-separated string.
    ///
    /// Accepts field names plus the shorthands `all` and `bp` (systolic and
    /// diastolic). Duplicates collapse; the result is in report order.
    pub fn from_csv(s: &str) -> Result<Self, UnknownFieldError> {
        let mut wanted = Vec::new();
        for part in s.split(',').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "" => {}
                "all" => wanted.extend(VitalField::ALL),
                "bp" => wanted.extend([VitalField::Systolic, VitalField::Diastolic]),
                other => wanted.push(other.parse()?),
            }
        }

        Ok(Self {
            fields: VitalField::ALL
                .into_iter()
                .filter(|f| wanted.contains(f))
                .collect(),
        })
    }

    pub fn fields(&self) -> &[VitalField] {
        &self.fields
    }

    pub fn contains(&self, field: VitalField) -> bool {
        self.fields.contains(&field)
    }

    /// Check if at least one field is selected.
    pub fn any_selected(&self) -> bool {
        !self.fields.is_empty()
    }
}
