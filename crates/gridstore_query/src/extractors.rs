//! Attribute extraction over encoded and materialized targets.

use std::collections::HashMap;
use std::sync::Arc;

use gridstore_codec::{from_cbor, seek_array_index, seek_map_field, EncodedBlob, Value};
use tracing::trace;

use crate::error::{QueryError, QueryResult};
use crate::path::{AttributePath, PathSegment};

/// The object an extraction runs against.
///
/// Entries hand extractors either the record's encoded wire form (when
/// its format supports direct field access) or the materialized value.
/// Both variants share the underlying data with the entry; nothing is
/// copied to build a target.
#[derive(Clone)]
pub enum ExtractionTarget {
    /// The encoded wire form; fields are read in place.
    Encoded(Arc<EncodedBlob>),
    /// The fully materialized value.
    Materialized(Arc<Value>),
}

impl ExtractionTarget {
    /// Short name of the target representation, for diagnostics.
    #[must_use]
    pub fn repr(&self) -> &'static str {
        match self {
            ExtractionTarget::Encoded(_) => "encoded",
            ExtractionTarget::Materialized(_) => "materialized",
        }
    }
}

/// A custom extractor registered for one attribute name.
///
/// Custom extractors take over the whole extraction for paths whose
/// leading field matches their registration name. They receive the target
/// in whichever representation the entry selected and must handle both.
pub trait AttributeExtractor: Send + Sync {
    /// Extracts the attribute named by `path` from `target`.
    fn extract(&self, target: &ExtractionTarget, path: &AttributePath) -> QueryResult<Value>;
}

/// Registry of attribute extractors.
///
/// Extraction falls back to structural navigation (map fields and array
/// indexes, nested to any depth) unless a custom extractor is registered
/// for the path's leading field. The registry is shared read-only across
/// entries and never mutated after construction.
#[derive(Default)]
pub struct Extractors {
    custom: HashMap<String, Arc<dyn AttributeExtractor>>,
}

impl Extractors {
    /// Creates a registry with no custom extractors.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            custom: HashMap::new(),
        }
    }

    /// Registers a custom extractor for an attribute name, replacing any
    /// previous registration for that name.
    #[must_use]
    pub fn with_extractor(
        mut self,
        attribute: impl Into<String>,
        extractor: Arc<dyn AttributeExtractor>,
    ) -> Self {
        self.custom.insert(attribute.into(), extractor);
        self
    }

    /// Extracts the attribute named by `path` from `target`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::AttributeNotFound`] when the path does not
    /// resolve, a codec error when the wire bytes are malformed, or
    /// whatever error a custom extractor raises.
    pub fn extract(&self, path: &AttributePath, target: &ExtractionTarget) -> QueryResult<Value> {
        if let Some(extractor) = self.custom.get(path.leading_field()) {
            trace!(path = %path, repr = target.repr(), "dispatching to custom extractor");
            return extractor.extract(target, path);
        }

        trace!(path = %path, repr = target.repr(), "navigating attribute path");
        match target {
            ExtractionTarget::Materialized(value) => navigate_value(path, value),
            ExtractionTarget::Encoded(blob) => navigate_wire(path, blob),
        }
    }
}

/// Walks a materialized value tree along the path.
fn navigate_value(path: &AttributePath, root: &Value) -> QueryResult<Value> {
    let mut current = root;
    for segment in path.segments() {
        let next = match segment {
            PathSegment::Field(name) => current.field(name),
            PathSegment::Index(index) => current.element(*index),
        };
        current = next.ok_or_else(|| QueryError::attribute_not_found(path.to_string()))?;
    }
    Ok(current.clone())
}

/// Walks encoded wire bytes along the path, materializing only the leaf.
///
/// Each step narrows the current wire slice to the matched field or
/// element; siblings are skipped, never decoded. A segment that lands on
/// a value of the wrong shape (a field step on a non-map, an index step
/// on a non-array) is a miss, matching the materialized walk.
fn navigate_wire(path: &AttributePath, blob: &EncodedBlob) -> QueryResult<Value> {
    if !blob.format().supports_direct_field_access() {
        return Err(QueryError::extractor(format!(
            "format {} does not support direct field access",
            blob.format()
        )));
    }

    let mut current: &[u8] = blob.payload();
    for segment in path.segments() {
        let next = match segment {
            PathSegment::Field(name) => {
                if wire_major_type(current) != Some(5) {
                    return Err(QueryError::attribute_not_found(path.to_string()));
                }
                seek_map_field(current, name)?
            }
            PathSegment::Index(index) => {
                if wire_major_type(current) != Some(4) {
                    return Err(QueryError::attribute_not_found(path.to_string()));
                }
                seek_array_index(current, *index)?
            }
        };
        current = next.ok_or_else(|| QueryError::attribute_not_found(path.to_string()))?;
    }
    Ok(from_cbor(current)?)
}

/// Major type of the first value in a wire slice.
fn wire_major_type(bytes: &[u8]) -> Option<u8> {
    bytes.first().map(|b| b >> 5)
}
