//! Aggregation over a match set.
//!
//! Everything here is a pure reduction over a slice of records in timestamp
//! order. Records that do not carry the requested field are skipped, the
//! same way a chart would leave a gap for them.

use crate::records::{VitalField, VitalRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Default number of readings in a moving-average window.
pub const DEFAULT_WINDOW: usize = 3;

/// Glucose band edges in mmol/L: hypoglycemia, normal, mild and severe
/// hyperglycemia.
pub const GLUCOSE_BAND_EDGES: [f64; 5] = [0.0, 6.0, 10.0, 15.0, 30.0];

/// Closed interval of values considered healthy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthyRange {
    pub lo: f64,
    pub hi: f64,
}

impl HealthyRange {
    /// Create a range, or `None` if the bounds are not finite or `lo > hi`.
    pub fn new(lo: f64, hi: f64) -> Option<Self> {
        (lo.is_finite() && hi.is_finite() && lo <= hi).then_some(Self { lo, hi })
    }

    /// Place a value in exactly one bucket.
    pub fn classify(&self, value: f64) -> Bucket {
        if value < self.lo {
            Bucket::Below
        } else if value > self.hi {
            Bucket::Above
        } else {
            Bucket::Within
        }
    }
}

/// Position of a value relative to a healthy range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Below,
    Within,
    Above,
}

/// How many values fell in each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub below: usize,
    pub within: usize,
    pub above: usize,
}

impl BucketCounts {
    fn add(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Below => self.below += 1,
            Bucket::Within => self.within += 1,
            Bucket::Above => self.above += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.below + self.within + self.above
    }
}

/// One value of a field at one moment, ready for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Result of [`summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub field: VitalField,
    /// Moving-average window size
    pub window: usize,
    /// Records that carried the field
    pub samples: usize,
    /// Records that did not
    pub skipped: usize,
    /// One point per position where the trailing window is full
    pub moving_average: Vec<TrendPoint>,
    pub buckets: BucketCounts,
}

impl Summary {
    /// The most recent moving-average value.
    pub fn latest_average(&self) -> Option<f64> {
        self.moving_average.last().map(|p| p.value)
    }
}

/// Values of `field` in timestamp order, skipping records without it.
pub fn series(records: &[VitalRecord], field: VitalField) -> Vec<TrendPoint> {
    records
        .iter()
        .filter_map(|r| {
            r.value(field).map(|value| TrendPoint {
                timestamp: r.timestamp,
                value,
            })
        })
        .collect()
}

/// Trailing moving average.
///
/// The first `window - 1` positions are omitted rather than partially
/// averaged, so every returned point averages exactly `window` values and is
/// stamped with the time of the newest one. A window of 0 is treated as 1.
pub fn moving_average(points: &[TrendPoint], window: usize) -> Vec<TrendPoint> {
    let window = window.max(1);
    points
        .windows(window)
        .map(|w| TrendPoint {
            timestamp: w[w.len() - 1].timestamp,
            value: w.iter().map(|p| p.value).mean(),
        })
        .collect()
}

/// Reduce a match set to a moving average and healthy-range bucket counts.
///
/// `samples + skipped` always equals `records.len()`, and the bucket counts
/// always sum to `samples`.
pub fn summarize(
    records: &[VitalRecord],
    field: VitalField,
    range: HealthyRange,
    window: usize,
) -> Summary {
    let points = series(records, field);

    let mut buckets = BucketCounts::default();
    for point in &points {
        buckets.add(range.classify(point.value));
    }

    Summary {
        field,
        window: window.max(1),
        samples: points.len(),
        skipped: records.len() - points.len(),
        moving_average: moving_average(&points, window),
        buckets,
    }
}

/// Descriptive statistics of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl FieldStats {
    /// Compute statistics, or `None` if there are no points.
    pub fn from_points(points: &[TrendPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        Some(Self {
            count: values.len(),
            mean: values.iter().mean(),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
            std_dev: values.iter().population_std_dev(),
        })
    }
}

/// Glucose readings per clinical band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlucoseBands {
    /// Below 6 mmol/L
    pub hypoglycemia: usize,
    /// 6 to 10 mmol/L
    pub normal: usize,
    /// 10 to 15 mmol/L
    pub mild_hyperglycemia: usize,
    /// 15 mmol/L and above
    pub severe_hyperglycemia: usize,
}

impl GlucoseBands {
    /// Count glucose values per band.
    ///
    /// Bands are half-open `[lower, upper)` except the last, which includes
    /// 30. Values outside `[0, 30]` are not counted.
    pub fn from_points(points: &[TrendPoint]) -> Self {
        let mut bands = Self::default();
        for point in points {
            if let Some(band) = Self::band_of(point.value) {
                *bands.slot(band) += 1;
            }
        }
        bands
    }

    fn band_of(value: f64) -> Option<usize> {
        let edges = GLUCOSE_BAND_EDGES;
        if !(edges[0]..=edges[4]).contains(&value) {
            return None;
        }
        Some(edges[1..4].iter().take_while(|&&edge| value >= edge).count())
    }

    fn slot(&mut self, band: usize) -> &mut usize {
        match band {
            0 => &mut self.hypoglycemia,
            1 => &mut self.normal,
            2 => &mut self.mild_hyperglycemia,
            _ => &mut self.severe_hyperglycemia,
        }
    }

    pub fn counts(&self) -> [usize; 4] {
        [
            self.hypoglycemia,
            self.normal,
            self.mild_hyperglycemia,
            self.severe_hyperglycemia,
        ]
    }

    pub fn total(&self) -> usize {
        self.counts().iter().sum()
    }

    /// Share of readings in each band, in percent. All zeros when empty.
    pub fn percentages(&self) -> [f64; 4] {
        let total = self.total();
        if total == 0 {
            return [0.0; 4];
        }
        self.counts().map(|c| c as f64 * 100.0 / total as f64)
    }
}
