//! Encoded record blobs and wire format tags.

use crate::error::{CodecError, CodecResult};

/// Frame tag byte for canonical CBOR payloads.
const TAG_CANONICAL_CBOR: u8 = 0x00;
/// Frame tag byte for custom-format payloads (followed by a u32 format id).
const TAG_CUSTOM: u8 = 0x01;

/// Wire format of an encoded record.
///
/// The format decides what can be done with a blob without materializing
/// it: canonical CBOR is self-describing and supports field-level access
/// directly on the wire bytes, while custom formats are opaque to
/// everything except their registered codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Canonical CBOR as produced by this crate's encoder.
    CanonicalCbor,
    /// An application-registered format, identified by its id.
    Custom(u32),
}

impl WireFormat {
    /// Whether fields can be read from the wire bytes of this format
    /// without materializing the whole record.
    #[must_use]
    pub const fn supports_direct_field_access(self) -> bool {
        matches!(self, WireFormat::CanonicalCbor)
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireFormat::CanonicalCbor => write!(f, "canonical-cbor"),
            WireFormat::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

/// The encoded form of a stored key or value.
///
/// A blob pairs raw payload bytes with the [`WireFormat`] they are encoded
/// in. Blobs are immutable once built; the query layer shares them behind
/// `Arc` and never rewrites payloads in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedBlob {
    format: WireFormat,
    payload: Vec<u8>,
}

impl EncodedBlob {
    /// Creates a blob from a format and its payload bytes.
    #[must_use]
    pub fn new(format: WireFormat, payload: Vec<u8>) -> Self {
        Self { format, payload }
    }

    /// The wire format of the payload.
    #[must_use]
    pub const fn format(&self) -> WireFormat {
        self.format
    }

    /// The raw payload bytes (without framing).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Serializes the blob into its storage frame: a one-byte format tag,
    /// an optional format id, then the payload.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self.format {
            WireFormat::CanonicalCbor => {
                let mut out = Vec::with_capacity(1 + self.payload.len());
                out.push(TAG_CANONICAL_CBOR);
                out.extend_from_slice(&self.payload);
                out
            }
            WireFormat::Custom(id) => {
                let mut out = Vec::with_capacity(5 + self.payload.len());
                out.push(TAG_CUSTOM);
                out.extend_from_slice(&id.to_be_bytes());
                out.extend_from_slice(&self.payload);
                out
            }
        }
    }

    /// Parses a blob from its storage frame.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty frame, an unknown tag, or a custom
    /// frame too short to carry its format id.
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let (&tag, rest) = bytes
            .split_first()
            .ok_or_else(|| CodecError::invalid_frame("empty frame"))?;
        match tag {
            TAG_CANONICAL_CBOR => Ok(Self::new(WireFormat::CanonicalCbor, rest.to_vec())),
            TAG_CUSTOM => {
                if rest.len() < 4 {
                    return Err(CodecError::invalid_frame("custom frame missing format id"));
                }
                let id = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
                Ok(Self::new(WireFormat::Custom(id), rest[4..].to_vec()))
            }
            other => Err(CodecError::unknown_format(format!("frame tag {other:#04x}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_access_capability_follows_format() {
        assert!(WireFormat::CanonicalCbor.supports_direct_field_access());
        assert!(!WireFormat::Custom(7).supports_direct_field_access());
    }

    #[test]
    fn cbor_frame_roundtrip() {
        let blob = EncodedBlob::new(WireFormat::CanonicalCbor, vec![0x01, 0x02]);
        let frame = blob.to_bytes();
        assert_eq!(frame, vec![0x00, 0x01, 0x02]);
        assert_eq!(EncodedBlob::from_bytes(&frame).unwrap(), blob);
    }

    #[test]
    fn custom_frame_roundtrip() {
        let blob = EncodedBlob::new(WireFormat::Custom(9), vec![0xaa]);
        let frame = blob.to_bytes();
        assert_eq!(frame, vec![0x01, 0, 0, 0, 9, 0xaa]);
        assert_eq!(EncodedBlob::from_bytes(&frame).unwrap(), blob);
    }

    #[test]
    fn reject_bad_frames() {
        assert!(matches!(
            EncodedBlob::from_bytes(&[]),
            Err(CodecError::InvalidFrame { .. })
        ));
        assert!(matches!(
            EncodedBlob::from_bytes(&[0x01, 0, 0]),
            Err(CodecError::InvalidFrame { .. })
        ));
        assert!(matches!(
            EncodedBlob::from_bytes(&[0x7f, 1, 2]),
            Err(CodecError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn accessors() {
        let blob = EncodedBlob::new(WireFormat::Custom(3), vec![1, 2, 3]);
        assert_eq!(blob.format(), WireFormat::Custom(3));
        assert_eq!(blob.payload(), &[1, 2, 3]);
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
        assert_eq!(WireFormat::Custom(3).to_string(), "custom:3");
        assert_eq!(WireFormat::CanonicalCbor.to_string(), "canonical-cbor");
    }
}
