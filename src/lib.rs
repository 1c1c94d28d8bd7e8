//! myhealth - personal vital-sign records.
//!
//! This library keeps a timestamp-ordered table of blood pressure, pulse and
//! blood glucose readings, finds everything recorded in a given day or month,
//! and summarizes it for reports and charts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          myhealth                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Search    │──▶│   Crawler   │──▶│  Aggregate  │       │
//! │  │ (day/month) │   │ (match set) │   │ (avg, bins) │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         ▲                                    │              │
//! │         │                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   Store /   │                     │   Report    │       │
//! │  │   Staging   │                     │ (text/json) │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use myhealth::{config::Config, core, store::VitalsStore, FieldSelection};
//!
//! let config = Config::load().expect("Failed to load config");
//! let table = VitalsStore::new(config.vitals_path())
//!     .load()
//!     .expect("Failed to load records");
//!
//! if let Some(set) = core::lookup(&table, "2024-01".parse().unwrap()).match_set() {
//!     let report = core::ReportBuilder::from_config(&config).build(set, &FieldSelection::default());
//!     println!("{}", report.render_text());
//! }
//! ```

pub mod config;
pub mod core;
pub mod records;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, HealthyRanges};
pub use core::{lookup, QueryOutcome, ReportBuilder, VitalsReport};
pub use records::{
    FieldSelection, Granularity, MatchKey, Reading, ReadingDraft, RecordTable, VitalField,
    VitalRecord,
};
pub use store::{RecordPatch, Session, StageError, StoreError, VitalsStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
