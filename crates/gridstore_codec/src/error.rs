//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding, or framing wire data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to decode wire bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Input is well-formed CBOR but violates the canonical profile.
    #[error("non-canonical encoding: {message}")]
    NonCanonical {
        /// Description of the violation.
        message: String,
    },

    /// Float values are forbidden in the canonical profile.
    #[error("float values are forbidden")]
    FloatForbidden,

    /// Indefinite-length items are forbidden.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLengthForbidden,

    /// Invalid UTF-8 in a text string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Input ended before the value was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A declared length exceeds the decoder's safety bounds.
    #[error("size limit exceeded: claimed {claimed}, max allowed {max_allowed}")]
    SizeLimitExceeded {
        /// Length claimed by the input.
        claimed: u64,
        /// Maximum the decoder will accept.
        max_allowed: u64,
    },

    /// Unsupported CBOR construct.
    #[error("unsupported CBOR construct: {construct}")]
    UnsupportedConstruct {
        /// Name of the unsupported construct.
        construct: String,
    },

    /// A blob frame carried an unknown format tag.
    #[error("unknown wire format: {format}")]
    UnknownFormat {
        /// The unrecognized format descriptor.
        format: String,
    },

    /// A blob frame is structurally invalid.
    #[error("invalid blob frame: {message}")]
    InvalidFrame {
        /// Description of the framing error.
        message: String,
    },
}

impl CodecError {
    /// Creates a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Creates a non-canonical encoding error.
    pub fn non_canonical(message: impl Into<String>) -> Self {
        Self::NonCanonical {
            message: message.into(),
        }
    }

    /// Creates an unsupported construct error.
    pub fn unsupported_construct(construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            construct: construct.into(),
        }
    }

    /// Creates an unknown format error.
    pub fn unknown_format(format: impl Into<String>) -> Self {
        Self::UnknownFormat {
            format: format.into(),
        }
    }

    /// Creates an invalid frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }
}
