//! Indexer configuration.

use memodex_common::{Result, error::Error};

use crate::value::FieldValue;

/// Initial capacity reserved for every newly created bucket.
pub const DEFAULT_BUCKET_CAPACITY_HINT: usize = 4;

/// Upper bound for [`IndexerOptions::bucket_capacity_hint`].
pub const MAX_BUCKET_CAPACITY_HINT: usize = 1 << 16;

/// Which field values keep a record out of the index for that field.
///
/// Exclusion applies per field: a record excluded from one field spec is still
/// indexed under every other spec. For a composite spec the record is excluded if
/// any value along its path is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusionPolicy {
    /// Only the explicit [`FieldValue::Null`] sentinel excludes a record. A missing
    /// field groups the record under [`FieldValue::Missing`].
    #[default]
    NullOnly,
    /// Both [`FieldValue::Null`] and [`FieldValue::Missing`] exclude the record.
    NullOrMissing,
}

impl ExclusionPolicy {
    #[inline]
    pub fn excludes(self, value: &FieldValue) -> bool {
        match self {
            ExclusionPolicy::NullOnly => value.is_null(),
            ExclusionPolicy::NullOrMissing => value.is_null() || value.is_missing(),
        }
    }
}

/// Whether an [`Indexer`](crate::Indexer) reconciles with its previous generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReusePolicy {
    /// Reuse unchanged buckets and nested mappings from the previous call.
    #[default]
    Incremental,
    /// Always return freshly built buckets.
    Disabled,
}

/// Configuration for index construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerOptions {
    /// Values that exclude a record from a field's index.
    pub exclusion: ExclusionPolicy,
    /// Reconciliation with the previous generation.
    pub reuse: ReusePolicy,
    /// Initial capacity of each new bucket.
    pub bucket_capacity_hint: usize,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            exclusion: ExclusionPolicy::default(),
            reuse: ReusePolicy::default(),
            bucket_capacity_hint: DEFAULT_BUCKET_CAPACITY_HINT,
        }
    }
}

impl IndexerOptions {
    pub fn with_exclusion(mut self, exclusion: ExclusionPolicy) -> Self {
        self.exclusion = exclusion;
        self
    }

    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    pub fn with_bucket_capacity_hint(mut self, hint: usize) -> Self {
        self.bucket_capacity_hint = hint;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_capacity_hint == 0 {
            return Err(Error::invalid_options(
                "bucket_capacity_hint",
                "must be greater than 0",
            ));
        }
        if self.bucket_capacity_hint > MAX_BUCKET_CAPACITY_HINT {
            return Err(Error::invalid_options(
                "bucket_capacity_hint",
                format!("must not exceed {MAX_BUCKET_CAPACITY_HINT}"),
            ));
        }
        Ok(())
    }

    /// Capacity to reserve for a new bucket; out-of-range hints are clamped.
    #[inline]
    pub(crate) fn bucket_capacity(&self) -> usize {
        self.bucket_capacity_hint.clamp(1, MAX_BUCKET_CAPACITY_HINT)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExclusionPolicy, IndexerOptions, MAX_BUCKET_CAPACITY_HINT, ReusePolicy};
    use crate::value::FieldValue;

    #[test]
    fn test_defaults() {
        let options = IndexerOptions::default();
        assert_eq!(options.exclusion, ExclusionPolicy::NullOnly);
        assert_eq!(options.reuse, ReusePolicy::Incremental);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(
            IndexerOptions::default()
                .with_bucket_capacity_hint(0)
                .validate()
                .is_err()
        );
        assert!(
            IndexerOptions::default()
                .with_bucket_capacity_hint(MAX_BUCKET_CAPACITY_HINT + 1)
                .validate()
                .is_err()
        );
        assert_eq!(
            IndexerOptions::default()
                .with_bucket_capacity_hint(0)
                .bucket_capacity(),
            1
        );
    }

    #[test]
    fn test_exclusion() {
        assert!(ExclusionPolicy::NullOnly.excludes(&FieldValue::Null));
        assert!(!ExclusionPolicy::NullOnly.excludes(&FieldValue::Missing));
        assert!(ExclusionPolicy::NullOrMissing.excludes(&FieldValue::Missing));
        assert!(!ExclusionPolicy::NullOrMissing.excludes(&FieldValue::from(0)));
        assert!(!ExclusionPolicy::NullOrMissing.excludes(&FieldValue::from("")));
    }
}
