//! Error types for the query layer.

use gridstore_codec::CodecError;
use thiserror::Error;

/// Result type for query-layer operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by entries and extractors.
///
/// None of these are transient: this layer performs no I/O, so every
/// failure is either a caller protocol violation (`InvalidArgument`,
/// `UnsupportedOperation`), a bad attribute path, or corruption surfaced
/// by the codec. Nothing is retried or silently recovered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A required argument was absent or unusable.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violation.
        message: String,
    },

    /// The operation is not available on this surface.
    #[error("unsupported operation: {message}")]
    UnsupportedOperation {
        /// Description of why the operation is refused.
        message: String,
    },

    /// An attribute path failed to parse.
    #[error("malformed attribute path {path:?}: {message}")]
    MalformedPath {
        /// The offending path text.
        path: String,
        /// Description of the parse failure.
        message: String,
    },

    /// An attribute path did not resolve against the target record.
    #[error("attribute not found: {path}")]
    AttributeNotFound {
        /// The rendered path that missed.
        path: String,
    },

    /// A registered extractor failed.
    #[error("extractor failed: {message}")]
    Extractor {
        /// Description of the failure.
        message: String,
    },

    /// Conversion between encoded and materialized forms failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl QueryError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported_operation(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// Creates a malformed path error.
    pub fn malformed_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an attribute not found error.
    pub fn attribute_not_found(path: impl Into<String>) -> Self {
        Self::AttributeNotFound { path: path.into() }
    }

    /// Creates an extractor failure error.
    pub fn extractor(message: impl Into<String>) -> Self {
        Self::Extractor {
            message: message.into(),
        }
    }
}
