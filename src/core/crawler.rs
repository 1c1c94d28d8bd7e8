//! Expansion of a single search hit into its full match set.
//!
//! Because the table is sorted by timestamp, every record sharing a key sits
//! in one contiguous run. Walking outward from any member until the key
//! changes therefore finds all of them.

use crate::records::{MatchKey, RecordTable, VitalRecord};
use serde::Serialize;
use std::ops::Range;

/// The maximal contiguous run of records sharing a match key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSet<'a> {
    /// The key every member shares
    pub key: MatchKey,
    /// Position of the run within the table
    #[serde(skip)]
    pub range: Range<usize>,
    /// The records, in table order
    pub records: &'a [VitalRecord],
}

impl<'a> MatchSet<'a> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a set produced by [`expand`].
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&'a VitalRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&'a VitalRecord> {
        self.records.last()
    }

    /// Table index of the last member.
    pub fn last_index(&self) -> usize {
        self.range.end.saturating_sub(1)
    }
}

/// Expand the record at `start` into every adjacent record matching `target`.
///
/// `start` must index a record whose key equals `target`; that record is
/// always part of the result.
///
/// # Panics
///
/// Panics if `start` is out of bounds.
pub fn expand(table: &RecordTable, start: usize, target: MatchKey) -> MatchSet<'_> {
    assert!(
        start < table.len(),
        "seed index {start} out of bounds for table of {}",
        table.len()
    );
    debug_assert!(target.contains(table.as_slice()[start].timestamp));

    let records = table.as_slice();
    let first = walk_left(records, start, target);
    let last = walk_right(records, start, target);

    tracing::debug!(%target, first, last, "match set expanded");

    MatchSet {
        key: target,
        range: first..last + 1,
        records: &records[first..=last],
    }
}

/// Lowest index of the run reaching down from `index`.
fn walk_left(records: &[VitalRecord], index: usize, target: MatchKey) -> usize {
    match index.checked_sub(1) {
        Some(prev) if target.contains(records[prev].timestamp) => {
            walk_left(records, prev, target)
        }
        _ => index,
    }
}

/// Highest index of the run reaching up from `index`.
fn walk_right(records: &[VitalRecord], index: usize, target: MatchKey) -> usize {
    let next = index + 1;
    if next < records.len() && target.contains(records[next].timestamp) {
        walk_right(records, next, target)
    } else {
        index
    }
}
