//! Recursive binary search over a record table.
//!
//! The table must be sorted by timestamp. That is not checked here: on an
//! unsorted table the result is unspecified.

use crate::records::{MatchKey, RecordTable, VitalRecord};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Find the index of any record whose key equals `target`.
///
/// The granularity comes from the target key. When several records share the
/// key, any one of them may be returned; [`expand`](crate::core::expand)
/// recovers the rest. Returns `None` when nothing matches, including on an
/// empty table.
pub fn find(table: &RecordTable, target: MatchKey) -> Option<usize> {
    let granularity = target.granularity();
    let found = bisect(table.as_slice(), 0, table.len(), &target, &|r: &VitalRecord| {
        MatchKey::of(r.timestamp, granularity)
    });

    match found {
        Some(index) => tracing::debug!(%target, index, "period located"),
        None => tracing::debug!(%target, "no record in period"),
    }
    found
}

/// Find the index of a record taken at exactly `timestamp`.
///
/// Used to reject duplicate entries before they are staged.
pub fn find_timestamp(table: &RecordTable, timestamp: NaiveDateTime) -> Option<usize> {
    bisect(table.as_slice(), 0, table.len(), &timestamp, &|r: &VitalRecord| r.timestamp)
}

/// Search `records[lo..hi]` for a record whose key equals `target`.
fn bisect<K, F>(
    records: &[VitalRecord],
    lo: usize,
    hi: usize,
    target: &K,
    key: &F,
) -> Option<usize>
where
    K: Ord,
    F: Fn(&VitalRecord) -> K,
{
    if lo >= hi {
        return None;
    }

    let mid = lo + (hi - lo) / 2;
    match target.cmp(&key(&records[mid])) {
        Ordering::Equal => Some(mid),
        Ordering::Less => bisect(records, lo, mid, target, key),
        Ordering::Greater => bisect(records, mid + 1, hi, target, key),
    }
}
