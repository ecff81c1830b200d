//! Seeded generation of synthetic records and list mutations.
//!
//! Generated records carry a fixed set of low-cardinality fields so that buckets
//! are populated by several records each. A small share of values is `Null` or
//! left out entirely, to exercise exclusion and the `Missing` grouping.

use std::sync::Arc;

use memodex_index::{FieldValue, MapRecord};

/// Field names present on generated records.
pub const GENERATED_FIELDS: [&str; 3] = ["group", "shard", "label"];

/// Shape of the generated records.
#[derive(Debug, Clone)]
pub struct RecordProfile {
    /// Number of distinct values per field.
    pub cardinality: u32,
    /// Percentage (0..=100) of values replaced by `Null`.
    pub null_percent: u8,
    /// Percentage (0..=100) of fields left out of the record.
    pub missing_percent: u8,
}

impl Default for RecordProfile {
    fn default() -> Self {
        RecordProfile {
            cardinality: 5,
            null_percent: 5,
            missing_percent: 5,
        }
    }
}

/// A deterministic source of records and list edits.
pub struct RecordGenerator {
    rng: fastrand::Rng,
    profile: RecordProfile,
    next_id: i64,
}

impl RecordGenerator {
    pub fn new(seed: u64) -> RecordGenerator {
        RecordGenerator::with_profile(seed, RecordProfile::default())
    }

    pub fn with_profile(seed: u64, profile: RecordProfile) -> RecordGenerator {
        assert_ne!(profile.cardinality, 0);
        RecordGenerator {
            rng: fastrand::Rng::with_seed(seed),
            profile,
            next_id: 0,
        }
    }

    /// Generates one record. Each record has a unique `id` field.
    pub fn record(&mut self) -> Arc<MapRecord> {
        let mut record = MapRecord::default();
        record.insert("id".to_string(), self.next_id.into());
        self.next_id += 1;
        for (i, field) in GENERATED_FIELDS.iter().enumerate() {
            if self.percent_hit(self.profile.missing_percent) {
                continue;
            }
            let value = if self.percent_hit(self.profile.null_percent) {
                FieldValue::Null
            } else {
                let n = self.rng.u32(0..self.profile.cardinality);
                // Alternate value kinds across fields.
                if i % 2 == 0 {
                    FieldValue::from(n)
                } else {
                    FieldValue::from(format!("v{n}"))
                }
            };
            record.insert(field.to_string(), value);
        }
        Arc::new(record)
    }

    pub fn records(&mut self, count: usize) -> Vec<Arc<MapRecord>> {
        (0..count).map(|_| self.record()).collect()
    }

    /// Applies one random edit (append, insert, remove or replace) to `records`.
    pub fn mutate(&mut self, records: &mut Vec<Arc<MapRecord>>) {
        if records.is_empty() {
            let record = self.record();
            records.push(record);
            return;
        }
        match self.rng.u8(0..4) {
            0 => append(records, self.record()),
            1 => {
                let at = self.rng.usize(0..=records.len());
                let record = self.record();
                records.insert(at, record);
            }
            2 => {
                let at = self.rng.usize(0..records.len());
                remove(records, at);
            }
            _ => {
                let at = self.rng.usize(0..records.len());
                let record = self.record();
                replace(records, at, record);
            }
        }
    }

    fn percent_hit(&mut self, percent: u8) -> bool {
        percent > 0 && self.rng.u8(0..100) < percent
    }
}

/// Returns a copy of `records` with `record` appended.
pub fn appended<R>(records: &[Arc<R>], record: Arc<R>) -> Vec<Arc<R>> {
    let mut next = records.to_vec();
    append(&mut next, record);
    next
}

pub fn append<R>(records: &mut Vec<Arc<R>>, record: Arc<R>) {
    records.push(record);
}

pub fn remove<R>(records: &mut Vec<Arc<R>>, at: usize) -> Arc<R> {
    records.remove(at)
}

/// Returns a copy of `records` without the elements `pred` selects.
pub fn without<R>(records: &[Arc<R>], mut pred: impl FnMut(&R) -> bool) -> Vec<Arc<R>> {
    records
        .iter()
        .filter(|record| !pred(record))
        .cloned()
        .collect()
}

pub fn replace<R>(records: &mut [Arc<R>], at: usize, record: Arc<R>) -> Arc<R> {
    std::mem::replace(&mut records[at], record)
}
