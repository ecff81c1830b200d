//! Field access on indexed records.

use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    rc::Rc,
    sync::Arc,
};

use crate::value::FieldValue;

/// A record that can be grouped by field values.
///
/// The indexer never mutates records; it only reads field values through this trait
/// and keeps shared references (`Arc<R>`) to the records in its buckets.
///
/// Typed records usually implement this with a `match` over their field-name
/// constants, returning [`FieldValue::Missing`] for any other name:
///
/// ```
/// use memodex_index::{FieldValue, Record};
///
/// struct Book {
///     title: String,
///     author_id: i64,
/// }
///
/// impl Record for Book {
///     fn value(&self, field: &str) -> FieldValue {
///         match field {
///             "title" => self.title.as_str().into(),
///             "authorId" => self.author_id.into(),
///             _ => FieldValue::Missing,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of `field`, or [`FieldValue::Missing`] when the record has
    /// no such field.
    fn value(&self, field: &str) -> FieldValue;
}

/// A dynamically shaped record: a map from field name to value.
pub type MapRecord = HashMap<String, FieldValue, ahash::RandomState>;

impl<S: BuildHasher> Record for HashMap<String, FieldValue, S> {
    fn value(&self, field: &str) -> FieldValue {
        self.get(field).cloned().unwrap_or(FieldValue::Missing)
    }
}

impl Record for BTreeMap<String, FieldValue> {
    fn value(&self, field: &str) -> FieldValue {
        self.get(field).cloned().unwrap_or(FieldValue::Missing)
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn value(&self, field: &str) -> FieldValue {
        (**self).value(field)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn value(&self, field: &str) -> FieldValue {
        (**self).value(field)
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn value(&self, field: &str) -> FieldValue {
        (**self).value(field)
    }
}

impl<T: Record + ?Sized> Record for Rc<T> {
    fn value(&self, field: &str) -> FieldValue {
        (**self).value(field)
    }
}

#[cfg(feature = "json")]
impl Record for serde_json::Map<String, serde_json::Value> {
    fn value(&self, field: &str) -> FieldValue {
        self.get(field)
            .map_or(FieldValue::Missing, FieldValue::from_json)
    }
}

/// Only JSON objects have fields; every field of any other JSON value is missing.
#[cfg(feature = "json")]
impl Record for serde_json::Value {
    fn value(&self, field: &str) -> FieldValue {
        match self {
            serde_json::Value::Object(map) => map.value(field),
            _ => FieldValue::Missing,
        }
    }
}
