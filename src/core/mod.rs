//! Core lookup and aggregation.
//!
//! This module contains:
//! - Binary search for a day or month in the record table
//! - The crawler that expands a hit into its full match set
//! - Aggregation of a match set (moving averages, healthy-range buckets)
//! - Query orchestration and report building

pub mod aggregate;
pub mod crawler;
pub mod query;
pub mod report;
pub mod search;

// Re-export commonly used types
pub use aggregate::{
    moving_average, series, summarize, Bucket, BucketCounts, FieldStats, GlucoseBands,
    HealthyRange, Summary, TrendPoint,
};
pub use crawler::{expand, MatchSet};
pub use query::{
    latest, lookup, records_before, records_before_period, summarize_period, QueryOutcome,
    WindowOutcome,
};
pub use report::{render_records, FieldReport, ReportBuilder, VitalsReport};
pub use search::{find, find_timestamp};
