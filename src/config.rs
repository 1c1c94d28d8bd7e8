//! Configuration for myhealth.

use crate::core::aggregate::{HealthyRange, DEFAULT_WINDOW};
use crate::records::VitalField;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the record file
    pub data_path: PathBuf,

    /// Name of the record file inside `data_path`
    pub vitals_file: String,

    /// Number of readings in each moving-average window
    pub moving_average_window: usize,

    /// Healthy range for each field
    pub healthy_ranges: HealthyRanges,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("myhealth");

        Self {
            data_path: data_dir,
            vitals_file: "vitals.json".to_string(),
            moving_average_window: DEFAULT_WINDOW,
            healthy_ranges: HealthyRanges::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if it does
    /// not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.healthy_ranges.check()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("myhealth")
            .join("config.json")
    }

    /// Full path of the record file.
    pub fn vitals_path(&self) -> PathBuf {
        self.data_path.join(&self.vitals_file)
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }
}

/// Healthy range per field.
///
/// Upper bounds follow the hypertension and tachycardia guide lines used on
/// the charts; glucose uses the normal band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthyRanges {
    pub systolic: HealthyRange,
    pub diastolic: HealthyRange,
    pub pulse: HealthyRange,
    pub glucose: HealthyRange,
}

impl Default for HealthyRanges {
    fn default() -> Self {
        Self {
            systolic: HealthyRange { lo: 90.0, hi: 150.0 },
            diastolic: HealthyRange { lo: 60.0, hi: 90.0 },
            pulse: HealthyRange { lo: 60.0, hi: 100.0 },
            glucose: HealthyRange { lo: 6.0, hi: 10.0 },
        }
    }
}

impl HealthyRanges {
    /// Range for one field.
    pub fn for_field(&self, field: VitalField) -> HealthyRange {
        match field {
            VitalField::Systolic => self.systolic,
            VitalField::Diastolic => self.diastolic,
            VitalField::Pulse => self.pulse,
            VitalField::Glucose => self.glucose,
        }
    }

    /// Reject ranges that are inverted or not finite.
    fn check(&self) -> Result<(), ConfigError> {
        for field in VitalField::ALL {
            let range = self.for_field(field);
            if HealthyRange::new(range.lo, range.hi).is_none() {
                return Err(ConfigError::InvalidRange {
                    field,
                    lo: range.lo,
                    hi: range.hi,
                });
            }
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid healthy range for {field}: [{lo}, {hi}]")]
    InvalidRange { field: VitalField, lo: f64, hi: f64 },
}
