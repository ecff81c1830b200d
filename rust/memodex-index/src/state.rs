//! The layered index produced by an indexing call.
//!
//! An [`IndexedState`] maps every field spec to an [`IndexedField`]. An
//! `IndexedField` maps observed values to an [`IndexNode`]: a [`Bucket`] at the
//! last level of a spec, or a nested `IndexedField` for the intermediate levels of a
//! composite spec.

use std::{fmt, sync::Arc};

use ahash::AHashMap;

use crate::{bucket::Bucket, spec::FieldSpec, value::FieldValue};

/// One entry of an [`IndexedField`].
pub enum IndexNode<R> {
    Bucket(Bucket<R>),
    Nested(Arc<IndexedField<R>>),
}

impl<R> IndexNode<R> {
    pub fn as_bucket(&self) -> Option<&Bucket<R>> {
        match self {
            IndexNode::Bucket(bucket) => Some(bucket),
            IndexNode::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Arc<IndexedField<R>>> {
        match self {
            IndexNode::Nested(field) => Some(field),
            IndexNode::Bucket(_) => None,
        }
    }

    /// Total number of records stored beneath this node.
    pub fn record_count(&self) -> usize {
        match self {
            IndexNode::Bucket(bucket) => bucket.len(),
            IndexNode::Nested(field) => field.record_count(),
        }
    }

    /// Returns `true` if both nodes share the same allocation.
    pub fn ptr_eq(&self, other: &IndexNode<R>) -> bool {
        match (self, other) {
            (IndexNode::Bucket(a), IndexNode::Bucket(b)) => a.ptr_eq(b),
            (IndexNode::Nested(a), IndexNode::Nested(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<R> Clone for IndexNode<R> {
    fn clone(&self) -> Self {
        match self {
            IndexNode::Bucket(bucket) => IndexNode::Bucket(bucket.clone()),
            IndexNode::Nested(field) => IndexNode::Nested(Arc::clone(field)),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for IndexNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexNode::Bucket(bucket) => bucket.fmt(f),
            IndexNode::Nested(field) => field.fmt(f),
        }
    }
}

/// A mapping from observed field value to the records (or nested mapping) holding
/// that value.
pub struct IndexedField<R> {
    entries: AHashMap<FieldValue, IndexNode<R>>,
    record_count: usize,
}

impl<R> IndexedField<R> {
    /// Returns an empty mapping.
    pub fn new() -> Self {
        IndexedField {
            entries: AHashMap::new(),
            record_count: 0,
        }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (FieldValue, IndexNode<R>)>) -> Self {
        let entries = entries.into_iter().collect::<AHashMap<_, _>>();
        let record_count = entries.values().map(IndexNode::record_count).sum();
        IndexedField {
            entries,
            record_count,
        }
    }

    /// Number of distinct values at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of records stored beneath this mapping.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn contains(&self, value: &FieldValue) -> bool {
        self.entries.contains_key(value)
    }

    pub fn get(&self, value: &FieldValue) -> Option<&IndexNode<R>> {
        self.entries.get(value)
    }

    /// Returns the bucket for `value` if this is the last level of the field spec.
    pub fn bucket(&self, value: &FieldValue) -> Option<&Bucket<R>> {
        self.get(value).and_then(IndexNode::as_bucket)
    }

    /// Returns the nested mapping for `value` if this is an intermediate level of a
    /// composite spec.
    pub fn nested(&self, value: &FieldValue) -> Option<&Arc<IndexedField<R>>> {
        self.get(value).and_then(IndexNode::as_nested)
    }

    /// Follows `path` level by level and returns the bucket at its end.
    ///
    /// Returns `None` if any value along the path is absent, or if the path length
    /// does not match the depth of the field spec.
    pub fn lookup(&self, path: &[FieldValue]) -> Option<&Bucket<R>> {
        let (value, rest) = path.split_first()?;
        match self.get(value)? {
            IndexNode::Bucket(bucket) if rest.is_empty() => Some(bucket),
            IndexNode::Nested(field) if !rest.is_empty() => field.lookup(rest),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldValue, &IndexNode<R>)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.entries.keys()
    }

    /// The observed values in ascending order.
    pub fn sorted_values(&self) -> Vec<&FieldValue> {
        let mut values = self.entries.keys().collect::<Vec<_>>();
        values.sort_unstable();
        values
    }

    /// The entries in ascending value order.
    pub fn sorted_entries(&self) -> Vec<(&FieldValue, &IndexNode<R>)> {
        let mut entries = self.entries.iter().collect::<Vec<_>>();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<R> Default for IndexedField<R> {
    fn default() -> Self {
        IndexedField::new()
    }
}

impl<R: fmt::Debug> fmt::Debug for IndexedField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.sorted_entries()).finish()
    }
}

/// The result of one indexing call: one [`IndexedField`] per field spec, in spec
/// order.
///
/// Every spec the state was built for is present, even when no record matched it.
pub struct IndexedState<R> {
    fields: Vec<(FieldSpec, Arc<IndexedField<R>>)>,
}

impl<R> IndexedState<R> {
    pub fn from_fields(fields: impl IntoIterator<Item = (FieldSpec, Arc<IndexedField<R>>)>) -> Self {
        IndexedState {
            fields: fields.into_iter().collect(),
        }
    }

    /// Number of field specs.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the mapping built for `spec`.
    pub fn get(&self, spec: &FieldSpec) -> Option<&Arc<IndexedField<R>>> {
        self.fields
            .iter()
            .find(|(candidate, _)| candidate == spec)
            .map(|(_, field)| field)
    }

    /// Returns the mapping whose spec [`name`](FieldSpec::name) is `name`: the field
    /// name itself for simple specs, the concatenated names for composite ones.
    pub fn field(&self, name: &str) -> Option<&Arc<IndexedField<R>>> {
        self.fields
            .iter()
            .find(|(spec, _)| spec.has_name(name))
            .map(|(_, field)| field)
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|(spec, _)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldSpec, &Arc<IndexedField<R>>)> {
        self.fields.iter().map(|(spec, field)| (spec, field))
    }
}

impl<R: fmt::Debug> fmt::Debug for IndexedState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (spec, field) in &self.fields {
            map.entry(&spec.name(), field);
        }
        map.finish()
    }
}
