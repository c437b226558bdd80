//! Canonical CBOR decoder and streaming field seek.
//!
//! Besides full materialization ([`from_cbor`]), this module provides the
//! wire-level navigation primitives ([`seek_map_field`],
//! [`seek_array_index`]) that let the query layer extract a single field
//! from an encoded record without materializing its siblings. Both walk
//! the same strict canonical profile the encoder produces.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;

/// Maximum element count accepted for arrays and maps.
/// Bounds allocation from untrusted input.
const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Maximum byte/text string length accepted.
/// Bounds allocation from untrusted input.
const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Decodes a single value from canonical CBOR bytes.
///
/// The entire input must be consumed by the value; trailing bytes are
/// rejected so that wire sub-slices stay exact.
///
/// # Errors
///
/// Returns an error on malformed input or on constructs outside the
/// canonical profile (floats, tags, indefinite lengths, unsorted map
/// keys, non-shortest headers).
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let value = decoder.decode()?;
    if !decoder.is_exhausted() {
        return Err(CodecError::non_canonical("trailing bytes after value"));
    }
    Ok(value)
}

/// Locates the wire sub-slice of a map field without materializing it.
///
/// `bytes` must encode a canonical CBOR map. Returns `Ok(None)` when the
/// map holds no text key equal to `field`. On a match, the returned slice
/// is the complete encoding of the field's value and can itself be walked
/// or passed to [`from_cbor`].
///
/// # Errors
///
/// Returns an error if `bytes` does not encode a map or is malformed.
pub fn seek_map_field<'a>(bytes: &'a [u8], field: &str) -> CodecResult<Option<&'a [u8]>> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let (major, arg) = decoder.read_header()?;
    if major != 5 {
        return Err(CodecError::decoding_failed(format!(
            "field seek requires a map, found major type {major}"
        )));
    }
    let count = decoder.container_count(arg)?;

    for _ in 0..count {
        let matched = decoder.next_key_is_text(field)?;
        let start = decoder.position();
        decoder.skip_value()?;
        if matched {
            return Ok(Some(&bytes[start..decoder.position()]));
        }
    }
    Ok(None)
}

/// Locates the wire sub-slice of an array element without materializing it.
///
/// `bytes` must encode a canonical CBOR array. Returns `Ok(None)` when
/// `index` is out of range.
///
/// # Errors
///
/// Returns an error if `bytes` does not encode an array or is malformed.
pub fn seek_array_index(bytes: &[u8], index: usize) -> CodecResult<Option<&[u8]>> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let (major, arg) = decoder.read_header()?;
    if major != 4 {
        return Err(CodecError::decoding_failed(format!(
            "index seek requires an array, found major type {major}"
        )));
    }
    let count = decoder.container_count(arg)?;
    if index >= count {
        return Ok(None);
    }

    for _ in 0..index {
        decoder.skip_value()?;
    }
    let start = decoder.position();
    decoder.skip_value()?;
    Ok(Some(&bytes[start..decoder.position()]))
}

/// A strict decoder over a canonical CBOR input slice.
pub struct CanonicalDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CanonicalDecoder<'a> {
    /// Creates a decoder over the given bytes.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset into the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns true once every input byte has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Decodes the next value, materializing it fully.
    pub fn decode(&mut self) -> CodecResult<Value> {
        let (major, arg) = self.read_header()?;
        match major {
            0 => i64::try_from(arg)
                .map(Value::Integer)
                .map_err(|_| CodecError::decoding_failed("unsigned integer out of i64 range")),
            1 => i64::try_from(arg)
                .map(|n| Value::Integer(-n - 1))
                .map_err(|_| CodecError::decoding_failed("negative integer out of i64 range")),
            2 => {
                let bytes = self.read_chunk(self.string_len(arg)?)?;
                Ok(Value::Bytes(bytes.to_vec()))
            }
            3 => {
                let bytes = self.read_chunk(self.string_len(arg)?)?;
                let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Value::Text(text.to_string()))
            }
            4 => {
                let count = self.container_count(arg)?;
                let mut items = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    items.push(self.decode()?);
                }
                Ok(Value::Array(items))
            }
            5 => self.decode_map(arg),
            6 => Err(CodecError::unsupported_construct("tagged value")),
            7 => self.decode_simple(arg),
            _ => unreachable!("major type is three bits"),
        }
    }

    /// Advances past the next value without materializing it.
    pub fn skip_value(&mut self) -> CodecResult<()> {
        let (major, arg) = self.read_header()?;
        match major {
            0 | 1 => Ok(()),
            2 | 3 => {
                self.read_chunk(self.string_len(arg)?)?;
                Ok(())
            }
            4 => {
                for _ in 0..self.container_count(arg)? {
                    self.skip_value()?;
                }
                Ok(())
            }
            5 => {
                for _ in 0..self.container_count(arg)? {
                    self.skip_value()?;
                    self.skip_value()?;
                }
                Ok(())
            }
            6 => Err(CodecError::unsupported_construct("tagged value")),
            7 => self.skip_simple(arg),
            _ => unreachable!("major type is three bits"),
        }
    }

    /// Decodes the next map key and reports whether it is the given text.
    ///
    /// Non-text keys are skipped and report false.
    fn next_key_is_text(&mut self, expected: &str) -> CodecResult<bool> {
        let (major, arg) = self.read_header()?;
        if major == 3 {
            let bytes = self.read_chunk(self.string_len(arg)?)?;
            return Ok(bytes == expected.as_bytes());
        }
        self.skip_body(major, arg)?;
        Ok(false)
    }

    /// Skips the body of a value whose header was already consumed.
    fn skip_body(&mut self, major: u8, arg: u64) -> CodecResult<()> {
        match major {
            0 | 1 => Ok(()),
            2 | 3 => {
                self.read_chunk(self.string_len(arg)?)?;
                Ok(())
            }
            4 => {
                for _ in 0..self.container_count(arg)? {
                    self.skip_value()?;
                }
                Ok(())
            }
            5 => {
                for _ in 0..self.container_count(arg)? {
                    self.skip_value()?;
                    self.skip_value()?;
                }
                Ok(())
            }
            6 => Err(CodecError::unsupported_construct("tagged value")),
            7 => self.skip_simple(arg),
            _ => unreachable!("major type is three bits"),
        }
    }

    fn decode_map(&mut self, arg: u64) -> CodecResult<Value> {
        let count = self.container_count(arg)?;
        let data = self.data;
        let mut pairs = Vec::with_capacity(count.min(1024));
        let mut prev_key: Option<&[u8]> = None;

        for _ in 0..count {
            let key_start = self.pos;
            let key = self.decode()?;
            let key_bytes = &data[key_start..self.pos];

            // Canonical maps carry keys in strictly increasing encoded order.
            if let Some(prev) = prev_key {
                let ord = prev
                    .len()
                    .cmp(&key_bytes.len())
                    .then_with(|| prev.cmp(key_bytes));
                if ord != std::cmp::Ordering::Less {
                    return Err(CodecError::non_canonical("map keys not in sorted order"));
                }
            }
            prev_key = Some(key_bytes);

            let value = self.decode()?;
            pairs.push((key, value));
        }
        Ok(Value::Map(pairs))
    }

    fn decode_simple(&mut self, info: u64) -> CodecResult<Value> {
        match info {
            20 => Ok(Value::Bool(false)),
            21 => Ok(Value::Bool(true)),
            22 | 23 => Ok(Value::Null),
            24 => {
                let simple = self.read_byte()?;
                if simple < 32 {
                    Err(CodecError::non_canonical(
                        "simple value must use direct encoding",
                    ))
                } else {
                    Err(CodecError::unsupported_construct(format!(
                        "simple value {simple}"
                    )))
                }
            }
            25..=27 => Err(CodecError::FloatForbidden),
            28..=30 => Err(CodecError::decoding_failed("reserved additional info")),
            31 => Err(CodecError::IndefiniteLengthForbidden),
            _ => Err(CodecError::unsupported_construct(format!(
                "simple value {info}"
            ))),
        }
    }

    fn skip_simple(&mut self, info: u64) -> CodecResult<()> {
        self.decode_simple(info)?;
        Ok(())
    }

    /// Reads the next header, returning `(major_type, argument)`.
    ///
    /// For major type 7 the argument is the raw additional info; for all
    /// other types it is the fully read, shortest-form-validated argument.
    fn read_header(&mut self) -> CodecResult<(u8, u64)> {
        let initial = self.read_byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;

        if major == 7 {
            return Ok((7, u64::from(info)));
        }

        let arg = match info {
            0..=23 => u64::from(info),
            24 => {
                let b = self.read_byte()?;
                self.require_shortest(u64::from(b), 24)?;
                u64::from(b)
            }
            25 => {
                let chunk = self.read_chunk(2)?;
                let v = u64::from(u16::from_be_bytes([chunk[0], chunk[1]]));
                self.require_shortest(v, 0x100)?;
                v
            }
            26 => {
                let chunk = self.read_chunk(4)?;
                let v = u64::from(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
                self.require_shortest(v, 0x1_0000)?;
                v
            }
            27 => {
                let chunk = self.read_chunk(8)?;
                let v = u64::from_be_bytes([
                    chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
                ]);
                self.require_shortest(v, 0x1_0000_0000)?;
                v
            }
            28..=30 => return Err(CodecError::decoding_failed("reserved additional info")),
            31 => return Err(CodecError::IndefiniteLengthForbidden),
            _ => unreachable!("additional info is five bits"),
        };
        Ok((major, arg))
    }

    fn require_shortest(&self, value: u64, min_for_width: u64) -> CodecResult<()> {
        if value < min_for_width {
            return Err(CodecError::non_canonical(
                "argument could be encoded in fewer bytes",
            ));
        }
        Ok(())
    }

    fn container_count(&self, arg: u64) -> CodecResult<usize> {
        if arg > MAX_CONTAINER_ELEMENTS {
            return Err(CodecError::SizeLimitExceeded {
                claimed: arg,
                max_allowed: MAX_CONTAINER_ELEMENTS,
            });
        }
        usize::try_from(arg).map_err(|_| CodecError::SizeLimitExceeded {
            claimed: arg,
            max_allowed: MAX_CONTAINER_ELEMENTS,
        })
    }

    fn string_len(&self, arg: u64) -> CodecResult<usize> {
        if arg > MAX_BYTES_LENGTH {
            return Err(CodecError::SizeLimitExceeded {
                claimed: arg,
                max_allowed: MAX_BYTES_LENGTH,
            });
        }
        usize::try_from(arg).map_err(|_| CodecError::SizeLimitExceeded {
            claimed: arg,
            max_allowed: MAX_BYTES_LENGTH,
        })
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_chunk(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or(CodecError::UnexpectedEof)?;
        if end > self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let chunk = &self.data[self.pos..end];
        self.pos = end;
        Ok(chunk)
    }
}
