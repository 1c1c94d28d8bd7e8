//! Demonstration of period lookup and reporting.
//!
//! This example shows how to:
//! 1. Stage and validate a few records in a session
//! 2. Look up a day and a month
//! 3. Walk back from the end of a day
//! 4. Build and print a report
//!
//! Run with: cargo run --example report_demo

use chrono::{NaiveDate, NaiveDateTime};
use myhealth::{
    core::{
        lookup, records_before_period, render_records, QueryOutcome, ReportBuilder, WindowOutcome,
    },
    records::{FieldSelection, MatchKey, ReadingDraft, RecordTable},
    store::Session,
    HealthyRanges,
};

fn at(m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, m, d)?.and_hms_opt(h, min, 0)
}

fn main() {
    println!("myhealth - Report Demo");
    println!("======================");
    println!();

    let entries = [
        (at(1, 5, 7, 30), Some(132), Some(86), Some(72), None),
        (at(1, 5, 8, 0), None, None, None, Some(5.4)),
        (at(1, 5, 13, 15), None, None, None, Some(8.9)),
        (at(1, 5, 19, 45), Some(141), Some(92), Some(104), Some(11.2)),
        (at(1, 6, 7, 30), Some(128), Some(84), Some(68), Some(6.3)),
        (at(1, 20, 7, 30), Some(152), Some(95), Some(77), None),
        (at(2, 1, 7, 30), Some(124), Some(80), Some(64), Some(7.1)),
    ];

    let mut session = Session::new(RecordTable::new());
    for (ts, systolic, diastolic, pulse, glucose) in entries {
        let Some(ts) = ts else { continue };
        let draft = ReadingDraft {
            systolic,
            diastolic,
            pulse,
            glucose,
        };
        if let Err(e) = session.apply(|staged| staged.add(ts, &draft)) {
            eprintln!("Skipped {ts}: {e}");
        }
    }

    // A reading outside the accepted range is discarded with the whole change
    let rejected = ReadingDraft {
        pulse: Some(230),
        ..ReadingDraft::default()
    };
    if let Some(ts) = at(1, 7, 9, 0) {
        match session.apply(|staged| staged.add(ts, &rejected)) {
            Ok(_) => println!("Unexpectedly accepted pulse 230"),
            Err(e) => println!("Rejected: {e}"),
        }
    }
    println!("{} records staged", session.table().len());
    println!();

    let table = session.table();
    let builder = ReportBuilder::new(3, HealthyRanges::default());

    for period in ["2024-01-05", "2024-01", "2024-03"] {
        let Ok(key) = period.parse::<MatchKey>() else {
            continue;
        };
        match lookup(table, key) {
            QueryOutcome::Found(set) => {
                let report = builder.build(&set, &FieldSelection::default());
                println!("{}", report.render_text());
            }
            QueryOutcome::NoRecords { period } => {
                println!("No records for {period}");
                println!();
            }
        }
    }

    if let Some(day) = NaiveDate::from_ymd_opt(2024, 1, 20) {
        println!("Last 4 records up to {day}:");
        if let WindowOutcome::Found { records, .. } =
            records_before_period(table, MatchKey::day(day), 4)
        {
            print!("{}", render_records(records));
        }
    }
}
