//! Whole-state memoization of from-scratch indexing functions.

use std::sync::Arc;

use crate::state::{IndexNode, IndexedField, IndexedState};

/// Wraps an indexing function and stabilizes the identity of its output.
///
/// Unlike [`Indexer`](crate::Indexer), the wrapped function has no memory: it
/// rebuilds the complete state every time. After each call the new state is compared
/// with the previous result:
///
/// - a bucket is replaced by the previous one when both are non-empty and hold the
///   same records, by reference, in the same order;
/// - a nested mapping is replaced by the previous one when it has the same values
///   and every entry beneath it was replaced;
/// - a field is unchanged when every value was replaced and no value was added or
///   removed. A field with no values at all always counts as changed.
///
/// When no field changed, the previous state itself (same `Arc`) is returned, so a
/// single [`Arc::ptr_eq`] tells the caller whether anything changed.
///
/// ```
/// use std::sync::Arc;
/// use memodex_index::{
///     FieldSpecs, FieldValue, IndexerOptions, MapRecord, Memoized, index_by_fields, memoize,
/// };
///
/// let specs = FieldSpecs::parse(["kind"]).unwrap();
/// let options = IndexerOptions::default();
/// let mut indexed: Memoized<_, MapRecord> =
///     memoize(|records: &[Arc<MapRecord>]| index_by_fields(&specs, records, &options));
///
/// let mut record = MapRecord::default();
/// record.insert("kind".to_string(), FieldValue::from(1));
/// let records = vec![Arc::new(record)];
///
/// let first = indexed.call(records.as_slice());
/// let second = indexed.call(records.as_slice());
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub struct Memoized<F, R> {
    f: F,
    last: Option<Arc<IndexedState<R>>>,
}

/// Wraps `f`; see [`Memoized`].
pub fn memoize<F, R>(f: F) -> Memoized<F, R> {
    Memoized { f, last: None }
}

impl<F, R> Memoized<F, R> {
    /// Invokes the wrapped function and returns its output with unchanged parts
    /// replaced by the previous result.
    pub fn call<A, S>(&mut self, args: A) -> Arc<IndexedState<R>>
    where
        F: FnMut(A) -> S,
        S: Into<Arc<IndexedState<R>>>,
    {
        let next = (self.f)(args).into();
        let result = match self.last.take() {
            Some(last) => stabilize(next, last),
            None => next,
        };
        self.last = Some(Arc::clone(&result));
        result
    }

    /// The most recently returned state.
    pub fn last(&self) -> Option<&Arc<IndexedState<R>>> {
        self.last.as_ref()
    }

    /// Forgets the previous result.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn into_inner(self) -> F {
        self.f
    }
}

fn stabilize<R>(
    next: Arc<IndexedState<R>>,
    last: Arc<IndexedState<R>>,
) -> Arc<IndexedState<R>> {
    let mut changed = next.len() != last.len();
    let mut fields = Vec::with_capacity(next.len());
    for (spec, field) in next.iter() {
        let merged = match last.get(spec) {
            Some(previous) => match stabilize_field(field, previous) {
                Some(merged) => {
                    changed = true;
                    Arc::new(merged)
                }
                None => Arc::clone(previous),
            },
            None => {
                changed = true;
                Arc::clone(field)
            }
        };
        fields.push((spec.clone(), merged));
    }

    if changed {
        log::trace!("memoized state changed");
        Arc::new(IndexedState::from_fields(fields))
    } else {
        log::trace!("memoized state unchanged, returning previous result");
        last
    }
}

/// Returns `None` if `previous` can stand in for `next`, otherwise the merged mapping
/// holding every reusable node of `previous`.
fn stabilize_field<R>(next: &IndexedField<R>, previous: &IndexedField<R>) -> Option<IndexedField<R>> {
    let mut changed = next.is_empty() || next.len() != previous.len();
    let mut entries = Vec::with_capacity(next.len());
    for (value, node) in next.iter() {
        let merged = match previous.get(value) {
            Some(previous_node) => stabilize_node(node, previous_node),
            None => None,
        };
        match merged {
            Some(reused) => entries.push((value.clone(), reused)),
            None => {
                changed = true;
                entries.push((value.clone(), partially_merged(node, previous.get(value))));
            }
        }
    }
    changed.then(|| IndexedField::from_entries(entries))
}

/// Returns the previous node if it can replace `node`.
fn stabilize_node<R>(node: &IndexNode<R>, previous: &IndexNode<R>) -> Option<IndexNode<R>> {
    match (node, previous) {
        (IndexNode::Bucket(bucket), IndexNode::Bucket(previous_bucket)) => bucket
            .same_records(previous_bucket)
            .then(|| IndexNode::Bucket(previous_bucket.clone())),
        (IndexNode::Nested(field), IndexNode::Nested(previous_field)) => {
            match stabilize_field(field, previous_field) {
                None => Some(IndexNode::Nested(Arc::clone(previous_field))),
                Some(_) => None,
            }
        }
        _ => None,
    }
}

/// A changed nested mapping still reuses whatever it can from the previous one.
fn partially_merged<R>(node: &IndexNode<R>, previous: Option<&IndexNode<R>>) -> IndexNode<R> {
    match (node, previous) {
        (IndexNode::Nested(field), Some(IndexNode::Nested(previous_field))) => {
            match stabilize_field(field, previous_field) {
                Some(merged) => IndexNode::Nested(Arc::new(merged)),
                None => IndexNode::Nested(Arc::clone(previous_field)),
            }
        }
        _ => node.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Memoized, memoize};
    use crate::{
        bucket::Bucket,
        spec::FieldSpec,
        state::{IndexNode, IndexedField, IndexedState},
        value::FieldValue,
    };

    type Rows = Vec<(i64, Arc<u32>)>;

    /// Builds a single-field state from (value, record) pairs, from scratch.
    fn build(rows: &Rows) -> IndexedState<u32> {
        let mut groups: Vec<(FieldValue, Vec<Arc<u32>>)> = Vec::new();
        for (value, record) in rows {
            let value = FieldValue::from(*value);
            match groups.iter_mut().find(|(v, _)| *v == value) {
                Some((_, records)) => records.push(record.clone()),
                None => groups.push((value, vec![record.clone()])),
            }
        }
        let field = IndexedField::from_entries(
            groups
                .into_iter()
                .map(|(v, records)| (v, IndexNode::Bucket(Bucket::from_vec(records)))),
        );
        IndexedState::from_fields([(FieldSpec::simple("v").unwrap(), Arc::new(field))])
    }

    #[test]
    fn test_first_call_passes_through() {
        let rows = vec![(1, Arc::new(1))];
        let mut memo: Memoized<_, u32> = memoize(build);
        assert!(memo.last().is_none());
        let first = memo.call(&rows);
        assert!(Arc::ptr_eq(&first, memo.last().unwrap()));
    }

    #[test]
    fn test_identical_input_returns_previous_state() {
        let rows = vec![(1, Arc::new(1)), (2, Arc::new(2))];
        let mut memo: Memoized<_, u32> = memoize(build);
        let first = memo.call(&rows);
        let second = memo.call(&rows);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_bucket_is_replaced_others_kept() {
        let one = Arc::new(1);
        let two = Arc::new(2);
        let three = Arc::new(3);
        let mut memo: Memoized<_, u32> = memoize(build);
        let first = memo.call(&vec![(1, one.clone()), (2, two.clone())]);
        let second = memo.call(&vec![(1, one.clone()), (2, two.clone()), (2, three.clone())]);

        assert!(!Arc::ptr_eq(&first, &second));
        let before = first.field("v").unwrap();
        let after = second.field("v").unwrap();
        let k1 = FieldValue::from(1);
        let k2 = FieldValue::from(2);
        assert!(before.bucket(&k1).unwrap().ptr_eq(after.bucket(&k1).unwrap()));
        assert!(!before.bucket(&k2).unwrap().ptr_eq(after.bucket(&k2).unwrap()));
        assert_eq!(after.bucket(&k2).unwrap().len(), 2);
    }

    #[test]
    fn test_removed_value_counts_as_change() {
        let one = Arc::new(1);
        let two = Arc::new(2);
        let mut memo: Memoized<_, u32> = memoize(build);
        let first = memo.call(&vec![(1, one.clone()), (2, two.clone())]);
        let second = memo.call(&vec![(1, one.clone())]);
        assert!(!Arc::ptr_eq(&first, &second));
        let after = second.field("v").unwrap();
        assert_eq!(after.len(), 1);
        assert!(
            first.field("v").unwrap().bucket(&FieldValue::from(1)).unwrap()
                .ptr_eq(after.bucket(&FieldValue::from(1)).unwrap())
        );
    }

    #[test]
    fn test_empty_field_always_changes() {
        let mut memo: Memoized<_, u32> = memoize(build);
        let first = memo.call(&Vec::new());
        let second = memo.call(&Vec::new());
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.field("v").unwrap().is_empty());
    }

    #[test]
    fn test_reset() {
        let rows = vec![(1, Arc::new(1))];
        let mut memo: Memoized<_, u32> = memoize(build);
        let first = memo.call(&rows);
        memo.reset();
        let second = memo.call(&rows);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_nested_mappings_are_compared_recursively() {
        let a = Arc::new(1u32);
        let b = Arc::new(2u32);
        let c = Arc::new(3u32);
        let spec = FieldSpec::composite(["x", "y"]).unwrap();

        let nested = |groups: &[(i64, i64, Vec<Arc<u32>>)]| {
            let mut outer: Vec<(FieldValue, Vec<(FieldValue, IndexNode<u32>)>)> = Vec::new();
            for (x, y, records) in groups {
                let node = IndexNode::Bucket(Bucket::from_vec(records.clone()));
                let x = FieldValue::from(*x);
                match outer.iter_mut().find(|(v, _)| *v == x) {
                    Some((_, inner)) => inner.push((FieldValue::from(*y), node)),
                    None => outer.push((x, vec![(FieldValue::from(*y), node)])),
                }
            }
            let field = IndexedField::from_entries(outer.into_iter().map(|(x, inner)| {
                (x, IndexNode::Nested(Arc::new(IndexedField::from_entries(inner))))
            }));
            IndexedState::from_fields([(spec.clone(), Arc::new(field))])
        };

        let mut memo: Memoized<_, u32> = memoize(nested);
        let before_groups = vec![(1, 1, vec![a.clone()]), (2, 1, vec![b.clone()])];
        let after_groups = vec![
            (1, 1, vec![a.clone()]),
            (2, 1, vec![b.clone()]),
            (2, 2, vec![c.clone()]),
        ];
        let first = memo.call(before_groups.as_slice());
        let second = memo.call(after_groups.as_slice());

        let before = first.get(&spec).unwrap();
        let after = second.get(&spec).unwrap();
        let one = FieldValue::from(1);
        let two = FieldValue::from(2);
        assert!(Arc::ptr_eq(before.nested(&one).unwrap(), after.nested(&one).unwrap()));
        assert!(!Arc::ptr_eq(before.nested(&two).unwrap(), after.nested(&two).unwrap()));
        assert!(
            before.nested(&two).unwrap().bucket(&one).unwrap()
                .ptr_eq(after.nested(&two).unwrap().bucket(&one).unwrap())
        );
    }
}
