//! Incremental indexing: regroup from scratch, then reconcile with the previous
//! generation to keep unchanged buckets reference-stable.

use std::sync::Arc;

use ahash::AHashSet;
use memodex_common::Result;

use crate::{
    grouping::{Draft, place_into, resolve_path},
    options::{IndexerOptions, ReusePolicy},
    record::Record,
    spec::{FieldSpec, FieldSpecs},
    state::{IndexedField, IndexedState},
    stats::{FieldStats, IndexStats},
    value::FieldValue,
};

/// A stateful indexer for a fixed set of field specs.
///
/// Every call to [`index`](Indexer::index) regroups the whole input, then compares
/// each top-level value's node against the previous call's result. The previous
/// node is handed out again (same `Arc`) when:
///
/// - every record placed under the value sits at the same position as the very same
///   record did in the previous generation, and
/// - the node holds as many records as the previous one did.
///
/// The second condition catches removals: a bucket that lost records still matches
/// position by position for the survivors, but must be rebuilt without the removed
/// ones. A composite spec's top-level node is reused wholesale or not at all.
///
/// When every top-level node of a spec is reused and no value disappeared, the
/// spec's [`IndexedField`] itself is reused.
///
/// The indexer remembers exactly one generation. Calls take `&mut self`, so a single
/// instance cannot be shared between concurrent callers; use one instance per
/// consumer instead.
pub struct Indexer<R> {
    specs: FieldSpecs,
    options: IndexerOptions,
    generation: Option<Generation<R>>,
    last_stats: Option<IndexStats>,
}

/// The previous call's result, retained for reconciliation.
struct Generation<R> {
    ordinal: u64,
    state: Arc<IndexedState<R>>,
}

impl<R> Indexer<R> {
    /// Creates an indexer with default options.
    ///
    /// # Errors
    ///
    /// Fails if `specs` is empty or contains duplicates.
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>) -> Result<Indexer<R>> {
        Indexer::with_options(specs, IndexerOptions::default())
    }

    pub fn with_options(
        specs: impl IntoIterator<Item = FieldSpec>,
        options: IndexerOptions,
    ) -> Result<Indexer<R>> {
        Indexer::from_specs(FieldSpecs::new(specs)?, options)
    }

    pub fn from_specs(specs: FieldSpecs, options: IndexerOptions) -> Result<Indexer<R>> {
        options.validate()?;
        Ok(Indexer {
            specs,
            options,
            generation: None,
            last_stats: None,
        })
    }

    pub fn specs(&self) -> &FieldSpecs {
        &self.specs
    }

    pub fn options(&self) -> &IndexerOptions {
        &self.options
    }

    /// The state returned by the most recent call.
    pub fn last_state(&self) -> Option<&Arc<IndexedState<R>>> {
        self.generation.as_ref().map(|generation| &generation.state)
    }

    /// Statistics of the most recent call.
    pub fn last_stats(&self) -> Option<&IndexStats> {
        self.last_stats.as_ref()
    }

    /// Forgets the previous generation; the next call builds every node afresh.
    pub fn reset(&mut self) {
        self.generation = None;
        self.last_stats = None;
    }

    /// Indexes `records`, reading grouping values from `processor(record)` instead of
    /// the record itself. The buckets still hold the original records.
    ///
    /// The processor runs once per record per call.
    pub fn index_with<G, P>(&mut self, records: &[Arc<R>], mut processor: P) -> Arc<IndexedState<R>>
    where
        G: Record,
        P: FnMut(&R) -> G,
    {
        let views = records
            .iter()
            .map(|record| processor(&**record))
            .collect::<Vec<_>>();
        self.run(records, |i| &views[i])
    }

    fn run<'g, G>(
        &mut self,
        records: &[Arc<R>],
        grouping: impl Fn(usize) -> &'g G,
    ) -> Arc<IndexedState<R>>
    where
        G: Record + ?Sized + 'g,
    {
        let ordinal = self.generation.as_ref().map_or(0, |g| g.ordinal) + 1;
        let prior_state = match self.options.reuse {
            ReusePolicy::Incremental => self.generation.take().map(|g| g.state),
            ReusePolicy::Disabled => None,
        };

        let mut stats = IndexStats {
            generation: ordinal,
            records: records.len(),
            fields: Vec::with_capacity(self.specs.len()),
        };
        let mut fields = Vec::with_capacity(self.specs.len());
        for spec in self.specs.iter() {
            let prior = prior_state.as_ref().and_then(|state| state.get(spec));
            let scan = scan_field(spec, records, &grouping, prior.map(Arc::as_ref), &self.options);
            let (field, mut field_stats) = reconcile(scan.draft, &scan.changed, prior);
            field_stats.excluded = scan.excluded;
            log::trace!(
                "generation {ordinal}, field '{spec}': {} reused, {} rebuilt, {} dropped, {} excluded",
                field_stats.reused,
                field_stats.rebuilt,
                field_stats.dropped,
                field_stats.excluded,
            );
            stats.fields.push((spec.clone(), field_stats));
            fields.push((spec.clone(), field));
        }

        let state = Arc::new(IndexedState::from_fields(fields));
        log::debug!(
            "indexer generation {ordinal}: {} records, {} field specs, {} nodes reused, {} rebuilt",
            stats.records,
            stats.fields.len(),
            stats.reused(),
            stats.rebuilt(),
        );
        self.generation = Some(Generation {
            ordinal,
            state: Arc::clone(&state),
        });
        self.last_stats = Some(stats);
        state
    }
}

impl<R: Record> Indexer<R> {
    /// Indexes `records`, reusing unchanged nodes of the previous generation.
    ///
    /// An empty input yields an empty mapping for every spec.
    pub fn index(&mut self, records: &[Arc<R>]) -> Arc<IndexedState<R>> {
        self.run(records, move |i| &*records[i])
    }
}

/// Groups `records` by every spec in `specs`, without any memory of previous calls.
///
/// This is the from-scratch building block that [`memoize`](crate::memoize) is meant
/// to wrap. It honors the same exclusion policy as [`Indexer`].
pub fn index_by_fields<R: Record>(
    specs: &FieldSpecs,
    records: &[Arc<R>],
    options: &IndexerOptions,
) -> IndexedState<R> {
    let grouping = move |i: usize| &*records[i];
    IndexedState::from_fields(specs.iter().map(|spec| {
        let scan = scan_field(spec, records, &grouping, None, options);
        (spec.clone(), Arc::new(scan.draft.freeze()))
    }))
}

/// One pass of the grouping primitive over the whole input for a single spec.
struct FieldScan<R> {
    draft: Draft<R>,
    /// Top-level values under which at least one record changed position.
    changed: AHashSet<FieldValue>,
    excluded: usize,
}

fn scan_field<'g, R, G>(
    spec: &FieldSpec,
    records: &[Arc<R>],
    grouping: &impl Fn(usize) -> &'g G,
    prior: Option<&IndexedField<R>>,
    options: &IndexerOptions,
) -> FieldScan<R>
where
    G: Record + ?Sized + 'g,
{
    let capacity = options.bucket_capacity();
    let mut scan = FieldScan {
        draft: Draft::new(),
        changed: AHashSet::new(),
        excluded: 0,
    };
    let mut path = Vec::with_capacity(spec.depth());
    for (i, record) in records.iter().enumerate() {
        if !resolve_path(grouping(i), spec, options.exclusion, &mut path) {
            scan.excluded += 1;
            continue;
        }
        if place_into(&mut scan.draft, record, &path, prior, capacity)
            && !scan.changed.contains(&path[0])
        {
            scan.changed.insert(path[0].clone());
        }
    }
    scan
}

/// Merges a freshly built draft with the previous generation's mapping for the same
/// spec.
///
/// A top-level node is taken over from `prior` if its value saw no change and its
/// record count is unchanged; otherwise the draft node is frozen. Values present in
/// `prior` but absent from the draft are dropped.
fn reconcile<R>(
    draft: Draft<R>,
    changed: &AHashSet<FieldValue>,
    prior: Option<&Arc<IndexedField<R>>>,
) -> (Arc<IndexedField<R>>, FieldStats) {
    let mut stats = FieldStats::default();
    let Some(prior) = prior else {
        stats.rebuilt = draft.len();
        return (Arc::new(draft.freeze()), stats);
    };

    let mut still_present = 0;
    let mut entries = Vec::with_capacity(draft.len());
    for (value, node) in draft.into_entries() {
        let prior_node = prior.get(&value);
        if prior_node.is_some() {
            still_present += 1;
        }
        let reusable = prior_node
            .filter(|_| !changed.contains(&value))
            .filter(|prior_node| prior_node.record_count() == node.record_count());
        match reusable {
            Some(prior_node) => {
                stats.reused += 1;
                entries.push((value, prior_node.clone()));
            }
            None => {
                stats.rebuilt += 1;
                entries.push((value, node.freeze()));
            }
        }
    }
    stats.dropped = prior.len() - still_present;

    if stats.rebuilt == 0 && stats.dropped == 0 {
        stats.field_reused = true;
        return (Arc::clone(prior), stats);
    }
    (Arc::new(IndexedField::from_entries(entries)), stats)
}
