//! Command implementations for memodex-cmd

use anyhow::{Context, Result};
use memodex_index::{ExclusionPolicy, FieldSpecs, FieldValue, IndexerOptions};
use serde_json::{Map, Value};

use crate::utils;

pub mod index;
pub mod reindex;

/// Parses `--field` arguments; `a+b` denotes a composite spec.
pub fn parse_specs(fields: &[String]) -> Result<FieldSpecs> {
    FieldSpecs::parse(fields.iter().map(String::as_str)).context("Invalid field specs")
}

pub fn indexer_options(exclude_missing: bool) -> Result<IndexerOptions> {
    let exclusion = if exclude_missing {
        ExclusionPolicy::NullOrMissing
    } else {
        ExclusionPolicy::NullOnly
    };
    let options = IndexerOptions::default().with_exclusion(exclusion);
    options.validate().context("Invalid indexer options")?;
    Ok(options)
}

/// Loads records from a JSON array or from a stream of JSON values (NDJSON).
pub fn load_records(path: &str) -> Result<Vec<Value>> {
    let content = utils::read_input(path)?;
    let records = if content.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Value>>(&content)
            .with_context(|| format!("Failed to parse JSON array in {}", path))?
    } else {
        serde_json::Deserializer::from_str(&content)
            .into_iter::<Value>()
            .enumerate()
            .map(|(i, record)| {
                record.with_context(|| format!("Failed to parse record {} in {}", i, path))
            })
            .collect::<Result<Vec<_>>>()?
    };
    let non_objects = records.iter().filter(|record| !record.is_object()).count();
    if non_objects > 0 {
        log::warn!("{non_objects} records in {path} are not JSON objects and have no fields");
    }
    log::debug!("loaded {} records from {path}", records.len());
    Ok(records)
}

/// Describes a field value as a JSON object member: `"value": ...`, or
/// `"missing": true` for records that lack the field.
pub fn value_entry(value: &FieldValue) -> Map<String, Value> {
    let mut entry = Map::new();
    let json = match value {
        FieldValue::Missing => {
            entry.insert("missing".to_string(), Value::Bool(true));
            return entry;
        }
        FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::from(*i),
        FieldValue::Float(f) => serde_json::Number::from_f64(f.into_inner())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Str(s) => Value::String(s.to_string()),
    };
    entry.insert("value".to_string(), json);
    entry
}
