//! # gridstore codec
//!
//! Wire encoding for gridstore records.
//!
//! This crate owns both representations a stored key or value can take:
//!
//! - the **materialized form**: a [`Value`] tree directly usable in
//!   memory, and
//! - the **encoded form**: an [`EncodedBlob`] carrying format-tagged
//!   wire bytes.
//!
//! Records are encoded as canonical CBOR, which is deterministic
//! (identical values produce identical bytes) and self-describing.
//! Self-description is what enables *direct field access*: the streaming
//! seek functions ([`seek_map_field`], [`seek_array_index`]) locate one
//! field's wire bytes without materializing the rest of the record, which
//! is how the query layer avoids full deserialization on formats that
//! permit it.
//!
//! The [`WireCodec`] service is the seam the query layer consumes:
//! capability probing plus conversions in both directions. The
//! [`StandardCodec`] implementation handles canonical CBOR natively and
//! dispatches registered opaque formats to their [`BlobCodec`].
//!
//! ## Usage
//!
//! ```
//! use gridstore_codec::{from_cbor, to_canonical_cbor, Value};
//!
//! let value = Value::map(vec![(Value::Text("id".into()), Value::Integer(7))]);
//! let bytes = to_canonical_cbor(&value).unwrap();
//! assert_eq!(from_cbor(&bytes).unwrap(), value);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod decoder;
mod encoder;
mod error;
mod service;
mod value;

pub use blob::{EncodedBlob, WireFormat};
pub use decoder::{from_cbor, seek_array_index, seek_map_field, CanonicalDecoder};
pub use encoder::{to_canonical_cbor, CanonicalEncoder};
pub use error::{CodecError, CodecResult};
pub use service::{BlobCodec, StandardCodec, WireCodec};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            "[a-z]{0,8}".prop_map(Value::Text),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|entries| {
                    Value::map(
                        entries
                            .into_iter()
                            .map(|(k, v)| (Value::Text(k), v))
                            .collect(),
                    )
                }),
            ]
        })
    }

    #[test]
    fn roundtrip_scalar_values() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Integer(-42),
            Value::Bytes(vec![1, 2, 3]),
            Value::Text("hello".into()),
        ] {
            let bytes = to_canonical_cbor(&value).unwrap();
            assert_eq!(from_cbor(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn roundtrip_nested_record() {
        let value = Value::map(vec![
            (
                Value::Text("users".into()),
                Value::Array(vec![
                    Value::map(vec![
                        (Value::Text("name".into()), Value::Text("alice".into())),
                        (Value::Text("age".into()), Value::Integer(30)),
                    ]),
                    Value::map(vec![
                        (Value::Text("name".into()), Value::Text("bob".into())),
                        (Value::Text("age".into()), Value::Integer(25)),
                    ]),
                ]),
            ),
            (Value::Text("count".into()), Value::Integer(2)),
        ]);

        let bytes = to_canonical_cbor(&value).unwrap();
        assert_eq!(from_cbor(&bytes).unwrap(), value);
    }

    proptest! {
        #[test]
        fn roundtrip_any_value(value in value_strategy()) {
            let bytes = to_canonical_cbor(&value).unwrap();
            prop_assert_eq!(from_cbor(&bytes).unwrap(), value);
        }

        #[test]
        fn encoding_is_deterministic(value in value_strategy()) {
            let first = to_canonical_cbor(&value).unwrap();
            let second = to_canonical_cbor(&value).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn seek_agrees_with_materialization(
            entries in proptest::collection::btree_map("[a-z]{1,6}", value_strategy(), 1..4)
        ) {
            let record = Value::map(
                entries
                    .iter()
                    .map(|(k, v)| (Value::Text(k.clone()), v.clone()))
                    .collect(),
            );
            let bytes = to_canonical_cbor(&record).unwrap();

            for (key, expected) in &entries {
                let slice = seek_map_field(&bytes, key).unwrap().unwrap();
                prop_assert_eq!(&from_cbor(slice).unwrap(), expected);
            }
        }
    }
}
