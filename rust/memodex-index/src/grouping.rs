//! The grouping primitive: placing one record into a mapping under construction.
//!
//! A pass over the input builds a [`Draft`] per field spec. Drafts hold growable
//! buckets; once the pass is complete they are frozen into the immutable
//! [`IndexedField`] form, unless the indexer decides to reuse the previous
//! generation's node instead.

use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    bucket::Bucket,
    options::ExclusionPolicy,
    record::Record,
    spec::FieldSpec,
    state::{IndexNode, IndexedField},
    value::FieldValue,
};

/// A mapping under construction.
pub struct Draft<R> {
    entries: AHashMap<FieldValue, DraftNode<R>>,
}

/// One entry of a [`Draft`]: a growing bucket or a nested draft.
pub enum DraftNode<R> {
    Bucket(Vec<Arc<R>>),
    Nested(Draft<R>),
}

impl<R> Draft<R> {
    pub fn new() -> Self {
        Draft {
            entries: AHashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, value: &FieldValue) -> Option<&DraftNode<R>> {
        self.entries.get(value)
    }

    pub fn into_entries(self) -> impl Iterator<Item = (FieldValue, DraftNode<R>)> {
        self.entries.into_iter()
    }

    /// Total number of records placed beneath this draft.
    pub fn record_count(&self) -> usize {
        self.entries.values().map(DraftNode::record_count).sum()
    }

    /// Converts the draft into its immutable form.
    pub fn freeze(self) -> IndexedField<R> {
        IndexedField::from_entries(
            self.entries
                .into_iter()
                .map(|(value, node)| (value, node.freeze())),
        )
    }
}

impl<R> Default for Draft<R> {
    fn default() -> Self {
        Draft::new()
    }
}

impl<R> DraftNode<R> {
    pub fn record_count(&self) -> usize {
        match self {
            DraftNode::Bucket(records) => records.len(),
            DraftNode::Nested(draft) => draft.record_count(),
        }
    }

    pub fn freeze(self) -> IndexNode<R> {
        match self {
            DraftNode::Bucket(records) => IndexNode::Bucket(Bucket::from_vec(records)),
            DraftNode::Nested(draft) => IndexNode::Nested(Arc::new(draft.freeze())),
        }
    }
}

/// Reads the value path of `spec` from `record` into `path`.
///
/// Returns `false`, leaving `path` in an unspecified state, if any value along the
/// path is excluded by `exclusion`. An excluded record contributes to no bucket of
/// this spec, and no intermediate mapping is created for it.
pub fn resolve_path<G: Record + ?Sized>(
    record: &G,
    spec: &FieldSpec,
    exclusion: ExclusionPolicy,
    path: &mut Vec<FieldValue>,
) -> bool {
    path.clear();
    for field in spec.fields() {
        let value = record.value(field);
        if exclusion.excludes(&value) {
            return false;
        }
        path.push(value);
    }
    true
}

/// Appends `record` to the bucket at `path` within `target`, creating the bucket and
/// any intermediate mappings on first encounter.
///
/// Returns `true` (changed) unless `prior` holds a bucket at the same path whose
/// record at the append position is this very record. A path with no prior bucket
/// always reports a change.
///
/// A path that ends at a nested mapping, or runs through a bucket, does not fit the
/// draft's depth: the record is not placed and the call reports a change.
pub fn place_into<R>(
    target: &mut Draft<R>,
    record: &Arc<R>,
    path: &[FieldValue],
    prior: Option<&IndexedField<R>>,
    bucket_capacity: usize,
) -> bool {
    let Some((value, rest)) = path.split_first() else {
        return false;
    };
    let prior_node = prior.and_then(|field| field.get(value));

    if rest.is_empty() {
        let node = target
            .entries
            .entry(value.clone())
            .or_insert_with(|| DraftNode::Bucket(Vec::with_capacity(bucket_capacity)));
        let DraftNode::Bucket(records) = node else {
            return true;
        };
        let position = records.len();
        records.push(Arc::clone(record));
        !prior_node
            .and_then(IndexNode::as_bucket)
            .is_some_and(|bucket| bucket.holds_at(position, record))
    } else {
        let node = target
            .entries
            .entry(value.clone())
            .or_insert_with(|| DraftNode::Nested(Draft::new()));
        let DraftNode::Nested(draft) = node else {
            return true;
        };
        place_into(
            draft,
            record,
            rest,
            prior_node.and_then(IndexNode::as_nested).map(Arc::as_ref),
            bucket_capacity,
        )
    }
}
