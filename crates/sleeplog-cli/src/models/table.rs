//! Date-keyed collection of sleep records

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::sleep::SleepRecord;
use crate::error::{Result, SleepLogError};

/// Sleep records keyed and ordered by date. At most one record per date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepTable {
    records: BTreeMap<NaiveDate, SleepRecord>,
}

impl SleepTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from records in any order. Fails on a repeated date.
    pub fn from_records(records: impl IntoIterator<Item = SleepRecord>) -> Result<Self> {
        let mut table = Self::new();
        table.merge(records.into_iter().collect())?;
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest date held, if any
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.keys().next_back().copied()
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.records.keys().next().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.records.contains_key(&date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&SleepRecord> {
        self.records.get(&date)
    }

    /// Records in ascending date order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SleepRecord> + ExactSizeIterator {
        self.records.values()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.keys().copied().collect()
    }

    /// Copy of the last `n` records
    pub fn tail(&self, n: usize) -> SleepTable {
        let skip = self.records.len().saturating_sub(n);
        Self {
            records: self
                .records
                .iter()
                .skip(skip)
                .map(|(date, record)| (*date, record.clone()))
                .collect(),
        }
    }

    /// Add new records. Every date must be new to the table and unique within
    /// `records`; on a collision nothing is inserted.
    ///
    /// Returns the number of records added.
    pub fn merge(&mut self, mut records: Vec<SleepRecord>) -> Result<usize> {
        records.sort_by_key(|r| r.date);

        for pair in records.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SleepLogError::MergeConflict { date: pair[0].date });
            }
        }
        if let Some(existing) = records.iter().find(|r| self.contains(r.date)) {
            return Err(SleepLogError::MergeConflict {
                date: existing.date,
            });
        }

        let added = records.len();
        self.records
            .extend(records.into_iter().map(|record| (record.date, record)));
        Ok(added)
    }
}

impl<'a> IntoIterator for &'a SleepTable {
    type Item = &'a SleepRecord;
    type IntoIter = std::collections::btree_map::Values<'a, NaiveDate, SleepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.values()
    }
}
