//! Secondary indexes over in-memory record collections, recomputed incrementally.
//!
//! Records are grouped by the value of one or more fields into [`Bucket`]s. A field
//! specification is either a single field name or an ordered list of names
//! (composite key), in which case the index nests one [`IndexedField`] level per
//! extra field before reaching the buckets.
//!
//! Two recomputation strategies share the same grouping primitive:
//!
//! - [`Indexer`] keeps the previous generation and, on every call, reuses any
//!   top-level bucket (or nested sub-index) whose membership did not change. Reuse
//!   is decided by position-and-identity comparison plus a size check, so a call is
//!   linear in the number of records per field spec.
//! - [`Memoized`] wraps any function that recomputes an [`IndexedState`] from scratch
//!   (for example [`index_by_fields`]) and stabilizes its output by comparing whole
//!   buckets element-wise. When nothing changed it hands back the previous state
//!   reference itself.
//!
//! Identity is `Arc` identity: compare buckets with [`Bucket::ptr_eq`], nested
//! sub-indexes and states with [`std::sync::Arc::ptr_eq`].
//!
//! ```
//! use std::sync::Arc;
//! use memodex_index::{FieldSpec, FieldValue, Indexer, MapRecord};
//!
//! fn record(author: i64) -> Arc<MapRecord> {
//!     let mut map = MapRecord::default();
//!     map.insert("authorId".to_string(), FieldValue::from(author));
//!     Arc::new(map)
//! }
//!
//! let mut indexer: Indexer<MapRecord> =
//!     Indexer::new([FieldSpec::simple("authorId").unwrap()]).unwrap();
//! let records = vec![record(1), record(2)];
//! let first = indexer.index(&records);
//!
//! let mut more = records.clone();
//! more.push(record(2));
//! let second = indexer.index(&more);
//!
//! let authors_before = first.field("authorId").unwrap();
//! let authors_after = second.field("authorId").unwrap();
//! let one = FieldValue::from(1);
//! let two = FieldValue::from(2);
//! assert!(authors_before.bucket(&one).unwrap().ptr_eq(authors_after.bucket(&one).unwrap()));
//! assert!(!authors_before.bucket(&two).unwrap().ptr_eq(authors_after.bucket(&two).unwrap()));
//! ```

pub mod bucket;
pub(crate) mod grouping;
pub mod indexer;
pub mod memoize;
pub mod options;
pub mod record;
pub mod spec;
pub mod state;
pub mod stats;
pub mod value;

pub use bucket::Bucket;
pub use indexer::{Indexer, index_by_fields};
pub use memoize::{Memoized, memoize};
pub use options::{ExclusionPolicy, IndexerOptions, ReusePolicy};
pub use record::{MapRecord, Record};
pub use spec::{FieldSpec, FieldSpecs};
pub use state::{IndexNode, IndexedField, IndexedState};
pub use stats::{FieldStats, IndexStats};
pub use value::FieldValue;
