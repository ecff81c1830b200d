//! Index command implementation

use std::sync::Arc;

use anyhow::Result;
use memodex_index::{
    FieldSpecs, FieldValue, IndexNode, IndexedField, IndexedState, IndexerOptions, Record,
    index_by_fields,
};
use serde_json::{Map, Value};

/// A loaded record together with its position in the input file.
pub struct Row {
    pub position: usize,
    pub record: Value,
}

impl Record for Row {
    fn value(&self, field: &str) -> FieldValue {
        self.record.value(field)
    }
}

pub fn run(fields: Vec<String>, exclude_missing: bool, file: String) -> Result<()> {
    let specs = super::parse_specs(&fields)?;
    let options = super::indexer_options(exclude_missing)?;
    let records = super::load_records(&file)?;

    let output = index_records(&specs, &options, records);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Indexes `records` and renders, per spec, the record positions grouped by value.
pub fn index_records(specs: &FieldSpecs, options: &IndexerOptions, records: Vec<Value>) -> Value {
    let rows = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| Arc::new(Row { position, record }))
        .collect::<Vec<_>>();
    let state = index_by_fields(specs, &rows, options);
    render_state(&state)
}

fn render_state(state: &IndexedState<Row>) -> Value {
    let mut output = Map::new();
    for (spec, field) in state.iter() {
        output.insert(spec.to_string(), render_field(field));
    }
    Value::Object(output)
}

fn render_field(field: &IndexedField<Row>) -> Value {
    field
        .sorted_entries()
        .into_iter()
        .map(|(value, node)| {
            let mut entry = super::value_entry(value);
            match node {
                IndexNode::Bucket(bucket) => {
                    let positions = bucket.iter().map(|row| Value::from(row.position));
                    entry.insert("positions".to_string(), Value::Array(positions.collect()));
                }
                IndexNode::Nested(nested) => {
                    entry.insert("entries".to_string(), render_field(nested));
                }
            }
            Value::Object(entry)
        })
        .collect()
}
