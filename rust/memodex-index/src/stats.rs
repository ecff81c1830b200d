//! Reuse statistics of an indexing call.

use crate::spec::FieldSpec;

/// Outcome of reconciling one field spec with the previous generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Top-level values whose node was taken over from the previous generation.
    pub reused: usize,
    /// Top-level values whose node was freshly built.
    pub rebuilt: usize,
    /// Top-level values present in the previous generation but not in this one.
    pub dropped: usize,
    /// Records excluded from this field.
    pub excluded: usize,
    /// The whole mapping was taken over from the previous generation.
    pub field_reused: bool,
}

/// Statistics for one [`Indexer`](crate::Indexer) call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// 1-based call counter of the indexer instance (reset by `Indexer::reset`).
    pub generation: u64,
    /// Number of input records.
    pub records: usize,
    /// Per-spec statistics, in spec order.
    pub fields: Vec<(FieldSpec, FieldStats)>,
}

impl IndexStats {
    pub fn field(&self, spec: &FieldSpec) -> Option<&FieldStats> {
        self.fields
            .iter()
            .find(|(candidate, _)| candidate == spec)
            .map(|(_, stats)| stats)
    }

    pub fn reused(&self) -> usize {
        self.fields.iter().map(|(_, stats)| stats.reused).sum()
    }

    pub fn rebuilt(&self) -> usize {
        self.fields.iter().map(|(_, stats)| stats.rebuilt).sum()
    }

    /// Returns `true` if every field mapping was taken over unchanged.
    pub fn is_unchanged(&self) -> bool {
        self.fields.iter().all(|(_, stats)| stats.field_reused)
    }
}
