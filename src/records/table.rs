//! The record table: vital-sign records kept in timestamp order.

use crate::records::key::{Granularity, MatchKey};
use crate::records::types::VitalRecord;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Records sorted ascending by timestamp.
///
/// Equal timestamps are allowed and stay in insertion order. The table is the
/// only source of truth during a lookup and is never mutated while one runs;
/// changes go through [`StagedTable`](crate::store::StagedTable) instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable {
    records: Vec<VitalRecord>,
}

impl RecordTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in any order.
    ///
    /// The sort is stable, so records sharing a timestamp keep their
    /// relative order.
    pub fn from_records(mut records: Vec<VitalRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VitalRecord> {
        self.records.get(index)
    }

    pub fn as_slice(&self) -> &[VitalRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VitalRecord> {
        self.records.iter()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<&VitalRecord> {
        self.records.last()
    }

    /// Match key of the record at `index`.
    pub fn key_at(&self, index: usize, granularity: Granularity) -> Option<MatchKey> {
        self.records
            .get(index)
            .map(|r| MatchKey::of(r.timestamp, granularity))
    }

    /// Check the ordering invariant.
    pub fn is_sorted(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    }

    /// Insert a record after any records with the same or earlier timestamp.
    /// Returns the index it landed at.
    pub(crate) fn insert_sorted(&mut self, record: VitalRecord) -> usize {
        let index = self.upper_bound(record.timestamp);
        self.records.insert(index, record);
        index
    }

    pub(crate) fn remove(&mut self, index: usize) -> Option<VitalRecord> {
        (index < self.records.len()).then(|| self.records.remove(index))
    }

    fn upper_bound(&self, timestamp: NaiveDateTime) -> usize {
        self.records.partition_point(|r| r.timestamp <= timestamp)
    }

    pub fn into_records(self) -> Vec<VitalRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a VitalRecord;
    type IntoIter = std::slice::Iter<'a, VitalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
