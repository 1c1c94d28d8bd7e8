//! Period reports.
//!
//! A report bundles a match set with the per-field aggregates a reader or a
//! plotting tool needs. It serializes to JSON and renders to plain text.

use crate::config::{Config, HealthyRanges};
use crate::core::aggregate::{
    series, summarize, FieldStats, GlucoseBands, HealthyRange, Summary, TrendPoint,
};
use crate::core::crawler::MatchSet;
use crate::records::{
    FieldSelection, Granularity, MatchKey, RecordTable, VitalField, VitalRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use uuid::Uuid;

/// Aggregates for one field over the period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: VitalField,
    pub unit: String,
    pub healthy_range: HealthyRange,
    pub stats: Option<FieldStats>,
    pub summary: Summary,
    /// Raw values for plotting
    pub series: Vec<TrendPoint>,
}

/// Everything recorded in one day or month, or in the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalsReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// `None` for a report over every record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<MatchKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<Granularity>,
    pub record_count: usize,
    pub records: Vec<VitalRecord>,
    /// One entry per selected field that has at least one reading
    pub fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose_bands: Option<GlucoseBands>,
}

/// Builder for period reports.
pub struct ReportBuilder {
    window: usize,
    ranges: HealthyRanges,
}

impl ReportBuilder {
    pub fn new(window: usize, ranges: HealthyRanges) -> Self {
        Self { window, ranges }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.moving_average_window, config.healthy_ranges)
    }

    /// Build a report from a match set.
    ///
    /// Records that carry none of the selected fields are left out, and so
    /// are fields with no readings in the period.
    pub fn build(&self, set: &MatchSet<'_>, selection: &FieldSelection) -> VitalsReport {
        self.build_records(Some(set.key), set.records, selection)
    }

    /// Build a report over every record in the table.
    pub fn build_all(&self, table: &RecordTable, selection: &FieldSelection) -> VitalsReport {
        self.build_records(None, table.as_slice(), selection)
    }

    fn build_records(
        &self,
        period: Option<MatchKey>,
        records: &[VitalRecord],
        selection: &FieldSelection,
    ) -> VitalsReport {
        let records: Vec<VitalRecord> = records
            .iter()
            .filter(|r| selection.fields().iter().any(|&f| r.value(f).is_some()))
            .cloned()
            .collect();

        let fields: Vec<FieldReport> = selection
            .fields()
            .iter()
            .map(|&field| self.field_report(&records, field))
            .filter(|report| report.summary.samples > 0)
            .collect();

        let glucose_bands = fields
            .iter()
            .find(|report| report.field == VitalField::Glucose)
            .map(|report| GlucoseBands::from_points(&report.series));

        tracing::info!(?period, records = records.len(), fields = fields.len(), "report built");

        VitalsReport {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            period,
            granularity: period.map(|p| p.granularity()),
            record_count: records.len(),
            records,
            fields,
            glucose_bands,
        }
    }

    fn field_report(&self, records: &[VitalRecord], field: VitalField) -> FieldReport {
        let range = self.ranges.for_field(field);
        let points = series(records, field);

        FieldReport {
            field,
            unit: field.unit().to_string(),
            healthy_range: range,
            stats: FieldStats::from_points(&points),
            summary: summarize(records, field, range, self.window),
            series: points,
        }
    }
}

impl VitalsReport {
    /// Render the report for a terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        match self.period {
            Some(period) => {
                let _ = writeln!(out, "Vitals for {period} ({} record(s))", self.record_count);
            }
            None => {
                let _ = writeln!(out, "All vitals ({} record(s))", self.record_count);
            }
        }
        let _ = writeln!(out);
        out.push_str(&render_records(&self.records));

        for report in &self.fields {
            let _ = writeln!(out);
            let _ = writeln!(out, "{} ({})", report.field.label(), report.unit);
            if let Some(stats) = report.stats {
                let _ = writeln!(
                    out,
                    "  mean {:.1}  min {:.1}  max {:.1}  sd {:.1}",
                    stats.mean, stats.min, stats.max, stats.std_dev
                );
            }
            let b = report.summary.buckets;
            let _ = writeln!(
                out,
                "  below {:.0}: {}  within: {}  above {:.0}: {}",
                report.healthy_range.lo, b.below, b.within, report.healthy_range.hi, b.above
            );
            match report.summary.latest_average() {
                Some(avg) => {
                    let _ = writeln!(
                        out,
                        "  The latest {}-reading moving average is {:.1} {}.",
                        report.summary.window, avg, report.unit
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  Fewer than {} readings, no moving average.",
                        report.summary.window
                    );
                }
            }
        }

        if let Some(bands) = self.glucose_bands {
            const LABELS: [&str; 4] = [
                "Below 6 (hypoglycemia)",
                "6-10 (normal)",
                "10-15 (mild hyperglycemia)",
                "Above 15 (severe hyperglycemia)",
            ];
            let _ = writeln!(out);
            let _ = writeln!(out, "Glucose bands");
            for (label, pct) in LABELS.iter().zip(bands.percentages()) {
                let _ = writeln!(out, "  {label:<32} {pct:>5.1}%");
            }
        }

        out
    }
}

/// Render records as a fixed-width table.
pub fn render_records(records: &[VitalRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<17} {:>5} {:>5} {:>6} {:>8}",
        "datetime", "sys", "dia", "pulse", "glucose"
    );

    let cell = |v: Option<u32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
    for record in records {
        let r = &record.reading;
        let _ = writeln!(
            out,
            "{:<17} {:>5} {:>5} {:>6} {:>8}",
            record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            cell(r.systolic),
            cell(r.diastolic),
            cell(r.pulse),
            r.glucose.map_or_else(|| "-".to_string(), |g| format!("{g:.1}")),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::lookup;
    use crate::records::Reading;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample_table() -> RecordTable {
        RecordTable::from_records(vec![
            VitalRecord::new(
                at(5, 7),
                Reading {
                    systolic: Some(125),
                    diastolic: Some(82),
                    pulse: Some(70),
                    glucose: None,
                },
            ),
            VitalRecord::new(
                at(5, 8),
                Reading {
                    glucose: Some(5.2),
                    ..Reading::default()
                },
            ),
            VitalRecord::new(
                at(5, 13),
                Reading {
                    glucose: Some(8.4),
                    ..Reading::default()
                },
            ),
            VitalRecord::new(
                at(5, 19),
                Reading {
                    glucose: Some(11.0),
                    pulse: Some(88),
                    ..Reading::default()
                },
            ),
        ])
    }

    #[test]
    fn test_build_full_report() {
        let table = sample_table();
        let set = lookup(&table, "2024-01-05".parse().unwrap())
            .into_match_set()
            .unwrap();
        let report =
            ReportBuilder::new(3, HealthyRanges::default()).build(&set, &FieldSelection::default());

        assert_eq!(report.record_count, 4);
        assert_eq!(report.granularity, Some(Granularity::Day));
        let fields: Vec<_> = report.fields.iter().map(|f| f.field).collect();
        assert_eq!(fields, VitalField::ALL.to_vec());

        let glucose = report
            .fields
            .iter()
            .find(|f| f.field == VitalField::Glucose)
            .unwrap();
        assert_eq!(glucose.summary.samples, 3);
        assert_eq!(glucose.summary.skipped, 1);
        assert_eq!(glucose.summary.buckets.below, 1);
        assert_eq!(glucose.summary.buckets.within, 1);
        assert_eq!(glucose.summary.buckets.above, 1);

        let bands = report.glucose_bands.unwrap();
        assert_eq!(bands.counts(), [1, 1, 1, 0]);
    }

    #[test]
    fn test_selection_filters_records_and_fields() {
        let table = sample_table();
        let set = lookup(&table, "2024-01".parse().unwrap())
            .into_match_set()
            .unwrap();
        let selection = FieldSelection::from_csv("bp").unwrap();
        let report = ReportBuilder::new(3, HealthyRanges::default()).build(&set, &selection);

        assert_eq!(report.record_count, 1);
        assert_eq!(report.fields.len(), 2);
        assert!(report.glucose_bands.is_none());
    }

    #[test]
    fn test_render_text() {
        let table = sample_table();
        let set = lookup(&table, "2024-01-05".parse().unwrap())
            .into_match_set()
            .unwrap();
        let text = ReportBuilder::new(3, HealthyRanges::default())
            .build(&set, &FieldSelection::default())
            .render_text();

        assert!(text.contains("Vitals for 2024-01-05 (4 record(s))"));
        assert!(text.contains("2024-01-05 07:00"));
        assert!(text.contains("The latest 3-reading moving average is 8.2 mmol/L."));
        assert!(text.contains("Fewer than 3 readings"));
        assert!(text.contains("Glucose bands"));
    }

    #[test]
    fn test_build_all_covers_whole_table() {
        let mut records = sample_table().into_records();
        records.push(VitalRecord::new(
            NaiveDate::from_ymd_opt(2024, 2, 3)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            Reading {
                systolic: Some(155),
                diastolic: Some(94),
                ..Reading::default()
            },
        ));
        let table = RecordTable::from_records(records);
        let builder = ReportBuilder::new(3, HealthyRanges::default());

        let report = builder.build_all(&table, &FieldSelection::default());
        assert_eq!(report.record_count, 5);
        assert_eq!(report.period, None);
        assert_eq!(report.granularity, None);
        let systolic = &report.fields[0];
        assert_eq!(systolic.field, VitalField::Systolic);
        assert_eq!(systolic.summary.samples, 2);
        assert_eq!(systolic.summary.buckets.above, 1);

        let text = report.render_text();
        assert!(text.contains("All vitals (5 record(s))"));
        assert!(text.contains("2024-02-03 09:00"));

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("period").is_none());

        let bp = builder.build_all(&table, &FieldSelection::from_csv("bp").unwrap());
        assert_eq!(bp.record_count, 2);
        assert!(bp.glucose_bands.is_none());
    }

    #[test]
    fn test_report_serializes() {
        let table = sample_table();
        let set = lookup(&table, "2024-01".parse().unwrap())
            .into_match_set()
            .unwrap();
        let report =
            ReportBuilder::new(3, HealthyRanges::default()).build(&set, &FieldSelection::default());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["period"]["month"]["month"], 1);
        assert_eq!(json["granularity"], "month");
        assert_eq!(json["record_count"], 4);
    }
}
