//! Reindex command implementation

use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result};
use memodex_index::{FieldSpecs, FieldValue, Indexer, IndexerOptions};
use serde::Serialize;
use serde_json::{Map, Value};

/// Reuse report for one field spec.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub spec: String,
    /// Top-level values whose bucket or nested mapping survived from `before`.
    pub reused: Vec<Map<String, Value>>,
    pub rebuilt: Vec<Map<String, Value>>,
    pub dropped: Vec<Map<String, Value>>,
    pub excluded: usize,
    pub field_reused: bool,
}

#[derive(Debug, Serialize)]
pub struct ReindexReport {
    pub before_records: usize,
    pub after_records: usize,
    pub fields: Vec<FieldReport>,
}

pub fn run(fields: Vec<String>, exclude_missing: bool, before: String, after: String) -> Result<()> {
    let specs = super::parse_specs(&fields)?;
    let options = super::indexer_options(exclude_missing)?;
    let before = super::load_records(&before)?;
    let after = super::load_records(&after)?;

    let report = reindex(specs, options, before, after)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Hands out one shared allocation per distinct record content.
///
/// Records are keyed by their serialized form. Object keys serialize in sorted
/// order, so records that differ only in key order share an entry.
#[derive(Default)]
struct Interner {
    records: AHashMap<String, Arc<Value>>,
}

impl Interner {
    fn intern(&mut self, record: Value) -> Result<Arc<Value>> {
        let key = serde_json::to_string(&record).context("Failed to serialize record")?;
        Ok(Arc::clone(
            self.records.entry(key).or_insert_with(|| Arc::new(record)),
        ))
    }

    fn intern_all(&mut self, records: Vec<Value>) -> Result<Vec<Arc<Value>>> {
        records.into_iter().map(|record| self.intern(record)).collect()
    }
}

/// Indexes `before`, then `after`, with a single indexer and reports which
/// top-level nodes the second call took over from the first.
pub fn reindex(
    specs: FieldSpecs,
    options: IndexerOptions,
    before: Vec<Value>,
    after: Vec<Value>,
) -> Result<ReindexReport> {
    let mut interner = Interner::default();
    let before = interner.intern_all(before)?;
    let after = interner.intern_all(after)?;
    log::debug!(
        "interned {} distinct records out of {}",
        interner.records.len(),
        before.len() + after.len()
    );

    let mut indexer = Indexer::from_specs(specs, options).context("Invalid indexer")?;
    let first = indexer.index(&before);
    let second = indexer.index(&after);
    let stats = indexer.last_stats().cloned().unwrap_or_default();

    let mut fields = Vec::with_capacity(second.len());
    for (spec, field) in second.iter() {
        let previous = first.get(spec);
        let field_stats = stats.field(spec).cloned().unwrap_or_default();
        let mut report = FieldReport {
            spec: spec.to_string(),
            reused: Vec::new(),
            rebuilt: Vec::new(),
            dropped: Vec::new(),
            excluded: field_stats.excluded,
            field_reused: field_stats.field_reused,
        };
        for (value, node) in field.sorted_entries() {
            let reused = previous
                .and_then(|previous| previous.get(value))
                .is_some_and(|old| old.ptr_eq(node));
            let target = if reused {
                &mut report.reused
            } else {
                &mut report.rebuilt
            };
            target.push(super::value_entry(value));
        }
        if let Some(previous) = previous {
            report.dropped = previous
                .sorted_values()
                .into_iter()
                .filter(|value| !field.contains(value))
                .map(|value: &FieldValue| super::value_entry(value))
                .collect();
        }
        fields.push(report);
    }

    Ok(ReindexReport {
        before_records: before.len(),
        after_records: after.len(),
        fields,
    })
}
