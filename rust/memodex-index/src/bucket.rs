//! Shared, immutable record buckets.

use std::{fmt, ops::Deref, slice, sync::Arc};

/// An ordered group of records sharing the same field value (or value path).
///
/// A bucket is immutable once built and cheap to clone: clones share the same
/// allocation. Reuse across indexer generations is observable through
/// [`Bucket::ptr_eq`], which is what identity-based change detection relies on.
pub struct Bucket<R> {
    records: Arc<Vec<Arc<R>>>,
}

impl<R> Bucket<R> {
    /// Creates a bucket from records already in input order.
    pub fn from_vec(records: Vec<Arc<R>>) -> Self {
        Bucket {
            records: Arc::new(records),
        }
    }

    /// Returns an empty bucket.
    pub fn empty() -> Self {
        Bucket::from_vec(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Arc<R>> {
        self.records.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Arc<R>] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, Arc<R>> {
        self.records.iter()
    }

    /// Returns `true` if both buckets are the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Bucket<R>) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    /// Returns `true` if both buckets are non-empty, have the same length and hold
    /// the same record references at every position.
    ///
    /// Two empty buckets are never considered the same.
    pub fn same_records(&self, other: &Bucket<R>) -> bool {
        if self.is_empty() || other.is_empty() || self.len() != other.len() {
            return false;
        }
        self.records
            .iter()
            .rev()
            .zip(other.records.iter().rev())
            .all(|(a, b)| Arc::ptr_eq(a, b))
    }

    /// Returns `true` if `record` is the very record stored at `index`.
    #[inline]
    pub(crate) fn holds_at(&self, index: usize, record: &Arc<R>) -> bool {
        self.records
            .get(index)
            .is_some_and(|held| Arc::ptr_eq(held, record))
    }
}

impl<R> Clone for Bucket<R> {
    fn clone(&self) -> Self {
        Bucket {
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> Default for Bucket<R> {
    fn default() -> Self {
        Bucket::empty()
    }
}

impl<R> Deref for Bucket<R> {
    type Target = [Arc<R>];

    fn deref(&self) -> &[Arc<R>] {
        self.as_slice()
    }
}

impl<'a, R> IntoIterator for &'a Bucket<R> {
    type Item = &'a Arc<R>;
    type IntoIter = slice::Iter<'a, Arc<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R: fmt::Debug> fmt::Debug for Bucket<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Bucket;

    #[test]
    fn test_identity() {
        let a = Arc::new(1);
        let b = Arc::new(2);
        let first = Bucket::from_vec(vec![a.clone(), b.clone()]);
        let clone = first.clone();
        let rebuilt = Bucket::from_vec(vec![a.clone(), b.clone()]);

        assert!(first.ptr_eq(&clone));
        assert!(!first.ptr_eq(&rebuilt));
        assert!(first.same_records(&rebuilt));
        assert_eq!(first.len(), 2);
        assert_eq!(**first.get(1).unwrap(), 2);
    }

    #[test]
    fn test_same_records() {
        let a = Arc::new("a");
        let b = Arc::new("b");
        let equal_value = Arc::new("a");

        let ab = Bucket::from_vec(vec![a.clone(), b.clone()]);
        assert!(!ab.same_records(&Bucket::from_vec(vec![b.clone(), a.clone()])));
        assert!(!ab.same_records(&Bucket::from_vec(vec![a.clone()])));
        assert!(!ab.same_records(&Bucket::from_vec(vec![equal_value, b.clone()])));
        assert!(!Bucket::<&str>::empty().same_records(&Bucket::empty()));
    }

    #[test]
    fn test_holds_at() {
        let a = Arc::new(1);
        let bucket = Bucket::from_vec(vec![a.clone()]);
        assert!(bucket.holds_at(0, &a));
        assert!(!bucket.holds_at(1, &a));
        assert!(!bucket.holds_at(0, &Arc::new(1)));
    }
}
