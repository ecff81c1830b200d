//! Field specifications: which fields an index groups records by.

use std::{fmt, ops::Deref, sync::Arc};

use memodex_common::{Result, error::Error, verify_arg};

/// Separator accepted by [`FieldSpec::parse`] between the fields of a composite key.
pub const COMPOSITE_SEPARATOR: char = '+';

/// A simple (single field) or composite (ordered list of fields) grouping key.
///
/// The identity of a spec is its ordered list of field names, so `["ab", "c"]` and
/// `["a", "bc"]` are different specs even though their concatenated
/// [`name`](FieldSpec::name) is the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    fields: Arc<[Arc<str>]>,
}

impl FieldSpec {
    /// Creates a spec grouping by a single field.
    pub fn simple(field: impl Into<Arc<str>>) -> Result<FieldSpec> {
        let field: Arc<str> = field.into();
        FieldSpec::composite([field])
    }

    /// Creates a spec grouping by an ordered list of fields.
    ///
    /// A one-element list is equivalent to [`FieldSpec::simple`].
    ///
    /// # Errors
    ///
    /// Fails if the list is empty or any field name is empty.
    pub fn composite<I, S>(fields: I) -> Result<FieldSpec>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let fields = fields.into_iter().map(Into::into).collect::<Arc<[Arc<str>]>>();
        let spec = FieldSpec { fields };
        if spec.fields.is_empty() {
            return Err(Error::invalid_field_spec(
                spec.to_string(),
                "at least one field is required",
            ));
        }
        if spec.fields.iter().any(|f| f.is_empty()) {
            return Err(Error::invalid_field_spec(
                spec.to_string(),
                "field names must not be empty",
            ));
        }
        Ok(spec)
    }

    /// Parses `"field"` or `"first+second"` into a spec.
    pub fn parse(text: &str) -> Result<FieldSpec> {
        FieldSpec::composite(text.split(COMPOSITE_SEPARATOR).map(str::trim))
    }

    /// The field names, outermost level first.
    pub fn fields(&self) -> &[Arc<str>] {
        &self.fields
    }

    /// Number of mapping levels the spec produces before reaching buckets.
    pub fn depth(&self) -> usize {
        self.fields.len()
    }

    pub fn is_composite(&self) -> bool {
        self.fields.len() > 1
    }

    /// The field names concatenated without a separator (`"publisherIdsubjectId"`).
    pub fn name(&self) -> String {
        self.fields.concat()
    }

    /// Checks whether [`name`](FieldSpec::name) equals `name` without allocating.
    pub fn has_name(&self, name: &str) -> bool {
        let mut rest = name;
        for field in self.fields.iter() {
            match rest.strip_prefix(&**field) {
                Some(tail) => rest = tail,
                None => return false,
            }
        }
        rest.is_empty()
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "{COMPOSITE_SEPARATOR}")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for FieldSpec {
    type Error = Error;

    fn try_from(field: &str) -> Result<Self> {
        FieldSpec::simple(field)
    }
}

impl TryFrom<&[&str]> for FieldSpec {
    type Error = Error;

    fn try_from(fields: &[&str]) -> Result<Self> {
        FieldSpec::composite(fields.iter().copied())
    }
}

/// The validated, ordered set of specs an indexer is built for.
///
/// Guarantees at least one spec and no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpecs(Arc<[FieldSpec]>);

impl FieldSpecs {
    pub fn new(specs: impl IntoIterator<Item = FieldSpec>) -> Result<FieldSpecs> {
        let specs = specs.into_iter().collect::<Vec<_>>();
        verify_arg!(specs, !specs.is_empty());
        let mut seen = ahash::AHashSet::with_capacity(specs.len());
        for spec in &specs {
            if !seen.insert(spec) {
                return Err(Error::duplicate_field_spec(spec.to_string()));
            }
        }
        Ok(FieldSpecs(specs.into()))
    }

    /// Parses each entry with [`FieldSpec::parse`].
    pub fn parse<'a>(texts: impl IntoIterator<Item = &'a str>) -> Result<FieldSpecs> {
        let specs = texts
            .into_iter()
            .map(FieldSpec::parse)
            .collect::<Result<Vec<_>>>()?;
        FieldSpecs::new(specs)
    }

    pub fn as_slice(&self) -> &[FieldSpec] {
        &self.0
    }
}

impl Deref for FieldSpecs {
    type Target = [FieldSpec];

    fn deref(&self) -> &[FieldSpec] {
        &self.0
    }
}
