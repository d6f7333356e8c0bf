//! Record collection and derived summary counts.

use std::collections::BTreeMap;

use jobscout_shared::{AggregateSummary, CategoryLabel, Record};

/// Count records per matched label. Every label appears, possibly with zero.
pub fn summarize(records: &[Record]) -> AggregateSummary {
    let mut count_by_category: BTreeMap<CategoryLabel, usize> =
        CategoryLabel::ALL.into_iter().map(|label| (label, 0)).collect();

    for record in records {
        for label in record.any_category_matched() {
            *count_by_category.entry(label).or_default() += 1;
        }
    }

    AggregateSummary {
        total_records: records.len(),
        count_by_category,
    }
}

/// Owns the records of one run. Holds no counters: [`summary`](Self::summary)
/// recomputes from the records on every call.
#[derive(Debug, Default, Clone)]
pub struct ResultAggregator {
    records: Vec<Record>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn summary(&self) -> AggregateSummary {
        summarize(&self.records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
