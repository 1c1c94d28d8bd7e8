//! Period queries: search, then crawl, then hand the match set on.

use crate::core::aggregate::{summarize, HealthyRange, Summary};
use crate::core::crawler::{expand, MatchSet};
use crate::core::search::find;
use crate::records::{MatchKey, RecordTable, VitalField, VitalRecord};

/// Result of looking up a period.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<'a> {
    /// Nothing was recorded in the period. Not an error.
    NoRecords { period: MatchKey },
    /// Every record in the period.
    Found(MatchSet<'a>),
}

impl<'a> QueryOutcome<'a> {
    pub fn match_set(&self) -> Option<&MatchSet<'a>> {
        match self {
            QueryOutcome::Found(set) => Some(set),
            QueryOutcome::NoRecords { .. } => None,
        }
    }

    pub fn into_match_set(self) -> Option<MatchSet<'a>> {
        match self {
            QueryOutcome::Found(set) => Some(set),
            QueryOutcome::NoRecords { .. } => None,
        }
    }

    /// Number of records found.
    pub fn len(&self) -> usize {
        self.match_set().map_or(0, MatchSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collect every record in `period`.
///
/// The crawler only runs when the search finds a seed.
pub fn lookup(table: &RecordTable, period: MatchKey) -> QueryOutcome<'_> {
    match find(table, period) {
        Some(seed) => QueryOutcome::Found(expand(table, seed, period)),
        None => QueryOutcome::NoRecords { period },
    }
}

/// Look up a period and summarize one field over it.
///
/// Returns `None` when the period has no records; the aggregator is not run
/// in that case.
pub fn summarize_period<'a>(
    table: &'a RecordTable,
    period: MatchKey,
    field: VitalField,
    range: HealthyRange,
    window: usize,
) -> Option<(MatchSet<'a>, Summary)> {
    let set = lookup(table, period).into_match_set()?;
    let summary = summarize(set.records, field, range, window);
    Some((set, summary))
}

/// The most recent record and its index.
pub fn latest(table: &RecordTable) -> Option<(usize, &VitalRecord)> {
    let index = table.len().checked_sub(1)?;
    table.get(index).map(|record| (index, record))
}

/// Up to `count` records ending at `index` inclusive.
///
/// The count is capped at the `index + 1` records that exist. An
/// out-of-bounds index or a count of 0 yields an empty slice.
pub fn records_before(table: &RecordTable, index: usize, count: usize) -> &[VitalRecord] {
    if index >= table.len() {
        return &[];
    }
    let start = (index + 1).saturating_sub(count);
    &table.as_slice()[start..=index]
}

/// Up to `count` records ending with the last record of `period`.
pub fn records_before_period(
    table: &RecordTable,
    period: MatchKey,
    count: usize,
) -> WindowOutcome<'_> {
    match lookup(table, period) {
        QueryOutcome::Found(set) => {
            let end = set.last_index();
            let records = records_before(table, end, count);
            WindowOutcome::Found {
                capped: records.len() < count,
                records,
            }
        }
        QueryOutcome::NoRecords { period } => WindowOutcome::NoRecords { period },
    }
}

/// Result of [`records_before_period`].
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome<'a> {
    NoRecords { period: MatchKey },
    Found {
        records: &'a [VitalRecord],
        /// Fewer records existed than were asked for
        capped: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Reading;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sys_record(ts: NaiveDateTime, sys: u32) -> VitalRecord {
        VitalRecord::new(
            ts,
            Reading {
                systolic: Some(sys),
                ..Reading::default()
            },
        )
    }

    fn sample_table() -> RecordTable {
        RecordTable::from_records(vec![
            sys_record(at(1, 5, 8), 120),
            sys_record(at(1, 5, 20), 122),
            sys_record(at(1, 6, 8), 118),
            sys_record(at(2, 1, 8), 130),
        ])
    }

    #[test]
    fn test_lookup_no_records() {
        let table = sample_table();
        let period: MatchKey = "2024-03-01".parse().unwrap();
        assert_eq!(lookup(&table, period), QueryOutcome::NoRecords { period });
        assert!(lookup(&table, period).is_empty());
        assert_eq!(
            lookup(&RecordTable::new(), period),
            QueryOutcome::NoRecords { period }
        );
    }

    #[test]
    fn test_lookup_day_and_month() {
        let table = sample_table();
        assert_eq!(lookup(&table, "2024-01-05".parse().unwrap()).len(), 2);
        assert_eq!(lookup(&table, "2024-01".parse().unwrap()).len(), 3);
        assert_eq!(lookup(&table, "2024-02".parse().unwrap()).len(), 1);
    }

    #[test]
    fn test_summarize_period() {
        let table = sample_table();
        let range = HealthyRange::new(90.0, 119.0).unwrap();

        let (set, summary) =
            summarize_period(&table, "2024-01".parse().unwrap(), VitalField::Systolic, range, 3)
                .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(summary.buckets.within, 1);
        assert_eq!(summary.buckets.above, 2);
        assert!((summary.latest_average().unwrap() - 120.0).abs() < 1e-9);

        assert!(summarize_period(
            &table,
            "2023-01".parse().unwrap(),
            VitalField::Systolic,
            range,
            3
        )
        .is_none());
    }

    #[test]
    fn test_latest() {
        assert!(latest(&RecordTable::new()).is_none());
        let table = sample_table();
        let (index, record) = latest(&table).unwrap();
        assert_eq!(index, 3);
        assert_eq!(record.reading.systolic, Some(130));
    }

    #[test]
    fn test_records_before() {
        let table = sample_table();
        assert_eq!(records_before(&table, 2, 2).len(), 2);
        assert_eq!(records_before(&table, 2, 2)[0].timestamp, at(1, 5, 20));
        assert_eq!(records_before(&table, 1, 10).len(), 2);
        assert!(records_before(&table, 1, 0).is_empty());
        assert!(records_before(&table, 9, 1).is_empty());
    }

    #[test]
    fn test_records_before_period() {
        let table = sample_table();
        match records_before_period(&table, "2024-01-05".parse().unwrap(), 5) {
            WindowOutcome::Found { records, capped } => {
                assert_eq!(records.len(), 2);
                assert!(capped);
                assert_eq!(records[1].timestamp, at(1, 5, 20));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let period: MatchKey = "2024-01-07".parse().unwrap();
        assert_eq!(
            records_before_period(&table, period, 5),
            WindowOutcome::NoRecords { period }
        );
    }
}
