//! Reading validation.
//!
//! Validation never mutates anything: it turns an unchecked [`ReadingDraft`]
//! into a [`Reading`] or reports why it cannot. The staging layer decides
//! whether to commit or discard based on the result.

use crate::records::types::Reading;
use serde::{Deserialize, Serialize};

/// Exclusive upper bound for blood pressure (mmHg).
pub const MAX_BLOOD_PRESSURE: u32 = 300;

/// Exclusive upper bound for pulse rate (bpm).
pub const MAX_PULSE: u32 = 200;

/// Exclusive upper bound for blood glucose (mmol/L).
pub const MAX_GLUCOSE: f64 = 30.0;

/// Unchecked readings as entered by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingDraft {
    pub systolic: Option<u32>,
    pub diastolic: Option<u32>,
    pub pulse: Option<u32>,
    pub glucose: Option<f64>,
}

impl From<Reading> for ReadingDraft {
    fn from(reading: Reading) -> Self {
        Self {
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            pulse: reading.pulse,
            glucose: reading.glucose,
        }
    }
}

/// Why a draft was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("systolic blood pressure {0} mmHg is outside 1-{max}", max = MAX_BLOOD_PRESSURE - 1)]
    Systolic(u32),
    #[error("diastolic blood pressure {0} mmHg is outside 1-{max}", max = MAX_BLOOD_PRESSURE - 1)]
    Diastolic(u32),
    #[error("pulse rate {0} bpm is outside 1-{max}", max = MAX_PULSE - 1)]
    Pulse(u32),
    #[error("glucose level {0} mmol/L must be above 0 and below {max}", max = MAX_GLUCOSE)]
    Glucose(f64),
    #[error("a record must contain at least one reading")]
    Empty,
}

/// Validate a draft.
///
/// Glucose is rounded to one decimal place before its range is checked.
pub fn validate_reading(draft: &ReadingDraft) -> Result<Reading, ValidationError> {
    let in_range = |value: u32, max: u32| value > 0 && value < max;

    if let Some(sys) = draft.systolic {
        if !in_range(sys, MAX_BLOOD_PRESSURE) {
            return Err(ValidationError::Systolic(sys));
        }
    }
    if let Some(dia) = draft.diastolic {
        if !in_range(dia, MAX_BLOOD_PRESSURE) {
            return Err(ValidationError::Diastolic(dia));
        }
    }
    if let Some(pulse) = draft.pulse {
        if !in_range(pulse, MAX_PULSE) {
            return Err(ValidationError::Pulse(pulse));
        }
    }

    let glucose = match draft.glucose {
        Some(raw) => {
            let rounded = (raw * 10.0).round() / 10.0;
            // NaN fails both comparisons
            if !(rounded > 0.0 && rounded < MAX_GLUCOSE) {
                return Err(ValidationError::Glucose(raw));
            }
            Some(rounded)
        }
        None => None,
    };

    let reading = Reading {
        systolic: draft.systolic,
        diastolic: draft.diastolic,
        pulse: draft.pulse,
        glucose,
    };

    if reading.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(reading)
}
