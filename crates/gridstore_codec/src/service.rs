//! Encoding capability service.
//!
//! The query layer never inspects wire formats itself: it asks a
//! [`WireCodec`] whether a blob can be read field-by-field in place, and
//! delegates every conversion between encoded and materialized forms to
//! it. Adding a wire format therefore touches this crate only.

use std::collections::HashMap;
use std::sync::Arc;

use crate::blob::{EncodedBlob, WireFormat};
use crate::decoder::from_cbor;
use crate::encoder::to_canonical_cbor;
use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Conversion and capability contract between encoded and materialized
/// record forms.
pub trait WireCodec: Send + Sync {
    /// Whether fields can be extracted from this blob's wire bytes
    /// without materializing the whole record.
    fn supports_direct_field_access(&self, blob: &EncodedBlob) -> bool;

    /// Fully materializes a blob into its in-memory value.
    fn materialize(&self, blob: &EncodedBlob) -> CodecResult<Value>;

    /// Encodes a materialized value into this codec's preferred format.
    fn encode(&self, value: &Value) -> CodecResult<EncodedBlob>;
}

/// Decoder/encoder pair for one custom wire format.
///
/// Custom formats are opaque: the service never claims direct field
/// access for them, so every extraction goes through [`BlobCodec::decode`].
pub trait BlobCodec: Send + Sync {
    /// Decodes a payload of this format into a value.
    fn decode(&self, payload: &[u8]) -> CodecResult<Value>;

    /// Encodes a value into a payload of this format.
    fn encode(&self, value: &Value) -> CodecResult<Vec<u8>>;
}

/// The standard codec service.
///
/// Handles canonical CBOR natively and dispatches custom formats to
/// codecs registered by format id.
#[derive(Default)]
pub struct StandardCodec {
    custom: HashMap<u32, Arc<dyn BlobCodec>>,
}

impl StandardCodec {
    /// Creates a service with no custom formats registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
        }
    }

    /// Registers a codec for a custom format id, replacing any previous
    /// registration for that id.
    #[must_use]
    pub fn with_custom(mut self, id: u32, codec: Arc<dyn BlobCodec>) -> Self {
        self.custom.insert(id, codec);
        self
    }

    fn custom_codec(&self, id: u32) -> CodecResult<&Arc<dyn BlobCodec>> {
        self.custom
            .get(&id)
            .ok_or_else(|| CodecError::unknown_format(format!("custom:{id}")))
    }
}

impl WireCodec for StandardCodec {
    fn supports_direct_field_access(&self, blob: &EncodedBlob) -> bool {
        blob.format().supports_direct_field_access()
    }

    fn materialize(&self, blob: &EncodedBlob) -> CodecResult<Value> {
        match blob.format() {
            WireFormat::CanonicalCbor => from_cbor(blob.payload()),
            WireFormat::Custom(id) => self.custom_codec(id)?.decode(blob.payload()),
        }
    }

    fn encode(&self, value: &Value) -> CodecResult<EncodedBlob> {
        Ok(EncodedBlob::new(
            WireFormat::CanonicalCbor,
            to_canonical_cbor(value)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Toy custom format: a single text string stored as raw UTF-8.
    struct RawTextCodec;

    impl BlobCodec for RawTextCodec {
        fn decode(&self, payload: &[u8]) -> CodecResult<Value> {
            let text = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(Value::Text(text.to_string()))
        }

        fn encode(&self, value: &Value) -> CodecResult<Vec<u8>> {
            match value {
                Value::Text(s) => Ok(s.clone().into_bytes()),
                other => Err(CodecError::unsupported_construct(other.kind())),
            }
        }
    }

    #[test]
    fn cbor_blobs_support_direct_access() {
        let service = StandardCodec::new();
        let blob = service.encode(&Value::Integer(5)).unwrap();
        assert!(service.supports_direct_field_access(&blob));
    }

    #[test]
    fn custom_blobs_are_opaque() {
        let service = StandardCodec::new().with_custom(1, Arc::new(RawTextCodec));
        let blob = EncodedBlob::new(WireFormat::Custom(1), b"hi".to_vec());
        assert!(!service.supports_direct_field_access(&blob));
    }

    #[test]
    fn materialize_roundtrips_cbor() {
        let service = StandardCodec::new();
        let value = Value::map(vec![(Value::Text("k".into()), Value::Integer(1))]);
        let blob = service.encode(&value).unwrap();
        assert_eq!(service.materialize(&blob).unwrap(), value);
    }

    #[test]
    fn materialize_dispatches_to_custom_codec() {
        let service = StandardCodec::new().with_custom(1, Arc::new(RawTextCodec));
        let blob = EncodedBlob::new(WireFormat::Custom(1), b"hello".to_vec());
        assert_eq!(
            service.materialize(&blob).unwrap(),
            Value::Text("hello".to_string())
        );
    }

    #[test]
    fn unknown_custom_format_fails() {
        let service = StandardCodec::new();
        let blob = EncodedBlob::new(WireFormat::Custom(42), vec![]);
        assert!(matches!(
            service.materialize(&blob),
            Err(CodecError::UnknownFormat { .. })
        ));
    }
}
