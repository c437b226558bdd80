//! # gridstore query
//!
//! Query-time entry abstraction for gridstore's indexing and predicate
//! evaluation.
//!
//! When a pass over stored records builds an index or evaluates
//! predicates, the same record is probed for many attributes. Decoding
//! the record once per probe would dominate the pass, so the pass wraps
//! each record it touches in a [`QueryEntry`]: an ephemeral, read-only
//! cursor that
//!
//! - converts between the record's encoded and materialized forms
//!   lazily, each direction at most once,
//! - extracts attributes straight from the wire bytes when the encoding
//!   supports direct field access, skipping full deserialization,
//! - memoizes every attribute extraction for the entry's lifetime, and
//! - compares and hashes by the materialized key, so entries work as
//!   transient cursors in result sets.
//!
//! Attribute paths ([`AttributePath`]) are tagged with the side they
//! read, key or value, and support nested fields and list indexes.
//! Extraction runs through an [`Extractors`] registry, which navigates
//! structurally by default and dispatches to registered
//! [`AttributeExtractor`]s by the path's leading field.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use gridstore_codec::{StandardCodec, Value, WireCodec};
//! use gridstore_query::{AttributePath, Extractors, QueryEntry, RecordForm};
//!
//! let codec: Arc<dyn WireCodec> = Arc::new(StandardCodec::new());
//! let record = Value::map(vec![
//!     (Value::Text("city".into()), Value::Text("lisbon".into())),
//! ]);
//! let key = codec.encode(&Value::Text("user:1".into())).unwrap();
//!
//! let entry = QueryEntry::new(
//!     Arc::clone(&codec),
//!     Some(RecordForm::Encoded(key)),
//!     RecordForm::Materialized(record),
//!     Arc::new(Extractors::empty()),
//! )
//! .unwrap();
//!
//! let city = entry.attribute(&AttributePath::value("city").unwrap()).unwrap();
//! assert_eq!(*city, Value::Text("lisbon".into()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod error;
mod extractors;
mod path;

pub use entry::{QueryEntry, RecordForm};
pub use error::{QueryError, QueryResult};
pub use extractors::{AttributeExtractor, ExtractionTarget, Extractors};
pub use path::{AttributePath, AttributeScope, PathSegment};
