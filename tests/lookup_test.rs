//! Integration tests for period lookup, aggregation and the record file.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use myhealth::core::{expand, find, lookup, summarize, HealthyRange, QueryOutcome};
use myhealth::records::{Granularity, MatchKey, Reading, RecordTable, VitalField, VitalRecord};
use myhealth::store::{Session, VitalsStore};
use myhealth::ReadingDraft;
use proptest::prelude::*;

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn systolic(ts: NaiveDateTime, sys: u32) -> VitalRecord {
    VitalRecord::new(
        ts,
        Reading {
            systolic: Some(sys),
            ..Reading::default()
        },
    )
}

/// Records spread over roughly four months starting 2023-12-01, with some
/// readings missing so aggregation has something to skip.
fn table_strategy() -> impl Strategy<Value = RecordTable> {
    prop::collection::vec(
        (
            0i64..120,
            0i64..24 * 60,
            prop::option::of(80u32..200),
            prop::option::of(3.0f64..20.0),
        ),
        0..60,
    )
    .prop_map(|entries| {
        let base = at(2023, 12, 1, 0);
        let records = entries
            .into_iter()
            .map(|(day, minute, sys, glucose)| {
                VitalRecord::new(
                    base + Duration::days(day) + Duration::minutes(minute),
                    Reading {
                        systolic: sys,
                        glucose,
                        pulse: Some(70),
                        ..Reading::default()
                    },
                )
            })
            .collect();
        RecordTable::from_records(records)
    })
}

fn granularity_strategy() -> impl Strategy<Value = Granularity> {
    prop_oneof![Just(Granularity::Day), Just(Granularity::Month)]
}

fn count_matching(table: &RecordTable, key: MatchKey) -> usize {
    table.iter().filter(|r| key.contains(r.timestamp)).count()
}

#[test]
fn test_sample_table_lookups() {
    let table = RecordTable::from_records(vec![
        systolic(at(2024, 1, 5, 8), 120),
        systolic(at(2024, 1, 5, 20), 122),
        systolic(at(2024, 1, 6, 8), 118),
        systolic(at(2024, 2, 1, 8), 130),
    ]);

    let day = lookup(&table, "2024-01-05".parse().unwrap());
    let values: Vec<_> = day
        .match_set()
        .unwrap()
        .records
        .iter()
        .map(|r| r.reading.systolic)
        .collect();
    assert_eq!(values, vec![Some(120), Some(122)]);

    let month = lookup(&table, "2024-01".parse().unwrap());
    assert_eq!(month.len(), 3);
    assert_eq!(
        month.match_set().unwrap().last().unwrap().reading.systolic,
        Some(118)
    );

    let missing: MatchKey = "2024-03-01".parse().unwrap();
    assert_eq!(
        lookup(&table, missing),
        QueryOutcome::NoRecords { period: missing }
    );
}

#[test]
fn test_month_key_distinguishes_years() {
    let table = RecordTable::from_records(vec![
        systolic(at(2023, 1, 10, 8), 120),
        systolic(at(2024, 1, 10, 8), 125),
    ]);

    let set = lookup(&table, "2024-01".parse().unwrap())
        .into_match_set()
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.records[0].reading.systolic, Some(125));
}

#[test]
fn test_add_save_reload_and_find() {
    let dir = tempfile::tempdir().unwrap();
    let store = VitalsStore::new(dir.path().join("vitals.json"));

    let mut session = Session::new(store.load().unwrap());
    session
        .apply(|staged| {
            staged.add(
                at(2024, 5, 2, 7),
                &ReadingDraft {
                    systolic: Some(128),
                    diastolic: Some(84),
                    pulse: Some(66),
                    glucose: None,
                },
            )?;
            staged.add(
                at(2024, 5, 1, 7),
                &ReadingDraft {
                    glucose: Some(6.44),
                    ..ReadingDraft::default()
                },
            )
        })
        .unwrap();
    store.save(session.table()).unwrap();

    let table = store.load().unwrap();
    assert!(table.is_sorted());
    let set = lookup(&table, "2024-05".parse().unwrap())
        .into_match_set()
        .unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.records[0].reading.glucose, Some(6.4));

    // A rejected change never reaches the file.
    assert!(session
        .apply(|staged| staged.add(at(2024, 5, 2, 7), &ReadingDraft::default()))
        .is_err());
    assert_eq!(store.load().unwrap().len(), 2);
}

proptest! {
    #[test]
    fn prop_find_hits_existing_key(
        table in table_strategy(),
        pick in any::<prop::sample::Index>(),
        granularity in granularity_strategy(),
    ) {
        prop_assume!(!table.is_empty());
        let i = pick.index(table.len());
        let key = table.key_at(i, granularity).unwrap();

        let j = find(&table, key);
        prop_assert!(j.is_some());
        prop_assert_eq!(table.key_at(j.unwrap(), granularity), Some(key));
    }

    #[test]
    fn prop_find_absent_key_is_none(
        table in table_strategy(),
        day in 0i64..150,
        granularity in granularity_strategy(),
    ) {
        let key = MatchKey::of(at(2023, 11, 15, 12) + Duration::days(day), granularity);
        let found = find(&table, key);
        if count_matching(&table, key) == 0 {
            prop_assert_eq!(found, None);
        } else {
            prop_assert!(key.contains(table.get(found.unwrap()).unwrap().timestamp));
        }
    }

    #[test]
    fn prop_expand_is_maximal_contiguous_and_complete(
        table in table_strategy(),
        pick in any::<prop::sample::Index>(),
        granularity in granularity_strategy(),
    ) {
        prop_assume!(!table.is_empty());
        let seed = pick.index(table.len());
        let key = table.key_at(seed, granularity).unwrap();
        let set = expand(&table, seed, key);

        prop_assert!(set.range.contains(&seed));
        prop_assert!(set.records.iter().all(|r| key.contains(r.timestamp)));
        if set.range.start > 0 {
            prop_assert!(!key.contains(table.get(set.range.start - 1).unwrap().timestamp));
        }
        if let Some(next) = table.get(set.range.end) {
            prop_assert!(!key.contains(next.timestamp));
        }
        prop_assert_eq!(set.len(), count_matching(&table, key));
    }

    #[test]
    fn prop_lookup_is_idempotent(
        table in table_strategy(),
        day in 0i64..120,
        granularity in granularity_strategy(),
    ) {
        let key = MatchKey::of(at(2023, 12, 1, 0) + Duration::days(day), granularity);
        prop_assert_eq!(lookup(&table, key), lookup(&table, key));
    }

    #[test]
    fn prop_bucket_counts_cover_samples(
        table in table_strategy(),
        lo in 0.0f64..15.0,
        width in 0.0f64..200.0,
        window in 0usize..6,
    ) {
        let range = HealthyRange::new(lo, lo + width).unwrap();
        for field in [VitalField::Systolic, VitalField::Glucose] {
            let summary = summarize(table.as_slice(), field, range, window);
            prop_assert_eq!(summary.buckets.total(), summary.samples);
            prop_assert_eq!(summary.samples + summary.skipped, table.len());
        }
    }
}
