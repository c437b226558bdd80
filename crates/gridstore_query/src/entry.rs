//! Query-time entry over one stored record.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use gridstore_codec::{EncodedBlob, Value, WireCodec};
use parking_lot::RwLock;
use tracing::trace;

use crate::error::{QueryError, QueryResult};
use crate::extractors::{ExtractionTarget, Extractors};
use crate::path::{AttributePath, AttributeScope};

/// The representation a record side starts in at entry construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordForm {
    /// The side arrives as its encoded wire form.
    Encoded(EncodedBlob),
    /// The side arrives already materialized.
    Materialized(Value),
}

/// One side of an entry: the form it was constructed with plus a
/// single-assignment slot for the converted form.
///
/// The origin never changes; each conversion direction is computed at
/// most once and then reused, so a form is never re-derived. Fills take
/// the write lock, which makes a warm cell safe to read from any thread.
struct DualCell {
    origin: Origin,
    decoded: RwLock<Option<Arc<Value>>>,
    encoded: RwLock<Option<Arc<EncodedBlob>>>,
}

enum Origin {
    Encoded(Arc<EncodedBlob>),
    Materialized(Arc<Value>),
}

impl DualCell {
    fn new(form: RecordForm) -> Self {
        let origin = match form {
            RecordForm::Encoded(blob) => Origin::Encoded(Arc::new(blob)),
            RecordForm::Materialized(value) => Origin::Materialized(Arc::new(value)),
        };
        Self {
            origin,
            decoded: RwLock::new(None),
            encoded: RwLock::new(None),
        }
    }

    /// The encoded form this cell was constructed with, if any.
    fn origin_encoded(&self) -> Option<&Arc<EncodedBlob>> {
        match &self.origin {
            Origin::Encoded(blob) => Some(blob),
            Origin::Materialized(_) => None,
        }
    }

    /// The materialized form, converting and caching on first demand.
    fn materialized(&self, codec: &dyn WireCodec) -> QueryResult<Arc<Value>> {
        let blob = match &self.origin {
            Origin::Materialized(value) => return Ok(Arc::clone(value)),
            Origin::Encoded(blob) => blob,
        };

        if let Some(value) = self.decoded.read().as_ref() {
            return Ok(Arc::clone(value));
        }

        let mut slot = self.decoded.write();
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        trace!(format = %blob.format(), "materializing record side");
        let value = Arc::new(codec.materialize(blob)?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    /// The encoded form, converting and caching on first demand.
    fn encoded(&self, codec: &dyn WireCodec) -> QueryResult<Arc<EncodedBlob>> {
        let value = match &self.origin {
            Origin::Encoded(blob) => return Ok(Arc::clone(blob)),
            Origin::Materialized(value) => value,
        };

        if let Some(blob) = self.encoded.read().as_ref() {
            return Ok(Arc::clone(blob));
        }

        let mut slot = self.encoded.write();
        if let Some(blob) = slot.as_ref() {
            return Ok(Arc::clone(blob));
        }
        trace!("encoding record side");
        let blob = Arc::new(codec.encode(value)?);
        *slot = Some(Arc::clone(&blob));
        Ok(blob)
    }
}

/// A read-only view over one stored record for the duration of one
/// query or index evaluation pass.
///
/// An entry is built once per record the pass touches and is probed
/// repeatedly, by many predicates or index expressions, for attribute
/// values on either its key or its value side. Every conversion between
/// encoded and materialized forms, and every attribute extraction, is
/// computed at most once and memoized for the entry's lifetime.
///
/// Entries are transient cursors: they are dropped when the pass ends,
/// never persisted, and never shared between unrelated passes. Each
/// entry is owned by a single evaluation task while its caches are cold;
/// once warm it may be read from other threads.
///
/// Equality and hashing are defined by the materialized key alone: two
/// entries over domain-equal keys are equal regardless of their values or
/// of which representation each key arrived in.
pub struct QueryEntry {
    codec: Arc<dyn WireCodec>,
    key: DualCell,
    value: DualCell,
    extractors: Arc<Extractors>,
    attribute_cache: RwLock<HashMap<AttributePath, Arc<Value>>>,
}

impl QueryEntry {
    /// Creates an entry over one record's key and value.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidArgument`] if `key` is `None`. No
    /// entry state exists after a failed construction.
    pub fn new(
        codec: Arc<dyn WireCodec>,
        key: Option<RecordForm>,
        value: RecordForm,
        extractors: Arc<Extractors>,
    ) -> QueryResult<Self> {
        let key = key.ok_or_else(|| QueryError::invalid_argument("entry key must be present"))?;
        Ok(Self {
            codec,
            key: DualCell::new(key),
            value: DualCell::new(value),
            extractors,
            attribute_cache: RwLock::new(HashMap::new()),
        })
    }

    /// The materialized key.
    ///
    /// Converts from the encoded form on first call and reuses the cached
    /// conversion afterwards.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the encoded key cannot be materialized.
    pub fn key(&self) -> QueryResult<Arc<Value>> {
        self.key.materialized(self.codec.as_ref())
    }

    /// The materialized value; same conversion rule as [`Self::key`].
    ///
    /// # Errors
    ///
    /// Returns a codec error if the encoded value cannot be materialized.
    pub fn value(&self) -> QueryResult<Arc<Value>> {
        self.value.materialized(self.codec.as_ref())
    }

    /// The encoded key, encoding and caching it if the key arrived
    /// materialized.
    ///
    /// # Errors
    ///
    /// Returns a codec error if encoding fails.
    pub fn key_data(&self) -> QueryResult<Arc<EncodedBlob>> {
        self.key.encoded(self.codec.as_ref())
    }

    /// The encoded value; same conversion rule as [`Self::key_data`].
    ///
    /// # Errors
    ///
    /// Returns a codec error if encoding fails.
    pub fn value_data(&self) -> QueryResult<Arc<EncodedBlob>> {
        self.value.encoded(self.codec.as_ref())
    }

    /// Selects the extraction target for the key (`use_key`) or value
    /// side.
    ///
    /// If the side arrived encoded and its format supports direct field
    /// access, the original blob is returned untouched; extraction will
    /// run against the wire bytes and full materialization is skipped.
    /// Otherwise the materialized form is returned, converting and
    /// caching it first if needed. The choice depends only on the
    /// construction-time representation and the format capability, never
    /// on which accessors were called before.
    ///
    /// # Errors
    ///
    /// Returns a codec error if materialization is needed and fails.
    pub fn target_object(&self, use_key: bool) -> QueryResult<ExtractionTarget> {
        let cell = if use_key { &self.key } else { &self.value };

        if let Some(blob) = cell.origin_encoded() {
            if self.codec.supports_direct_field_access(blob) {
                return Ok(ExtractionTarget::Encoded(Arc::clone(blob)));
            }
        }
        Ok(ExtractionTarget::Materialized(
            cell.materialized(self.codec.as_ref())?,
        ))
    }

    /// The value of one attribute of this record, extracted through the
    /// registry and memoized.
    ///
    /// The first probe of a path selects a target via
    /// [`Self::target_object`] (keyed on the path's scope), runs the
    /// extractor registry, and caches the result; later probes of the
    /// same path return the cached value without invoking the registry
    /// again. Registry errors are returned as-is and are not cached.
    ///
    /// # Errors
    ///
    /// Propagates registry and codec errors unchanged.
    pub fn attribute(&self, path: &AttributePath) -> QueryResult<Arc<Value>> {
        if let Some(cached) = self.attribute_cache.read().get(path) {
            return Ok(Arc::clone(cached));
        }

        trace!(path = %path, "attribute cache miss");
        let target = self.target_object(path.scope() == AttributeScope::Key)?;
        let extracted = Arc::new(self.extractors.extract(path, &target)?);

        let mut cache = self.attribute_cache.write();
        let value = cache
            .entry(path.clone())
            .or_insert_with(|| Arc::clone(&extracted));
        Ok(Arc::clone(value))
    }

    /// Refuses to replace the value.
    ///
    /// Entries are read-only query cursors; stored state changes only
    /// through the store's write path.
    ///
    /// # Errors
    ///
    /// Always returns [`QueryError::UnsupportedOperation`].
    pub fn set_value(&self, _new_value: Value) -> QueryResult<Value> {
        Err(QueryError::unsupported_operation(
            "query entries are read-only; writes go through the store write path",
        ))
    }
}

impl std::fmt::Debug for QueryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEntry")
            .field("cached_attributes", &self.attribute_cache.read().len())
            .finish_non_exhaustive()
    }
}

impl PartialEq for QueryEntry {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self.key(), other.key()) {
            (Ok(a), Ok(b)) => a == b,
            // An undecodable key is corruption; fall back to comparing the
            // wire forms so Eq stays reflexive and consistent with Hash.
            (Err(_), Err(_)) => match (self.key.origin_encoded(), other.key.origin_encoded()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for QueryEntry {}

impl Hash for QueryEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.key() {
            Ok(value) => value.hash(state),
            Err(_) => {
                if let Some(blob) = self.key.origin_encoded() {
                    blob.hash(state);
                }
            }
        }
    }
}
