//! Canonical CBOR encoder.

use crate::error::CodecResult;
use crate::value::Value;

/// Encodes a value to canonical CBOR bytes.
///
/// The output is deterministic per RFC 8949 Section 4.2.1: map keys are
/// sorted by their encoded form (length-first, then bytewise), integers
/// use the shortest possible encoding, and all lengths are definite.
/// Determinism is what makes encoded keys comparable at the wire level.
///
/// # Errors
///
/// Returns an error if the value cannot be encoded.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.push(value)?;
    Ok(encoder.finish())
}

/// A canonical CBOR encoder over an owned output buffer.
pub struct CanonicalEncoder {
    out: Vec<u8>,
}

impl CanonicalEncoder {
    /// Creates a new encoder.
    #[must_use]
    pub fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// Creates a new encoder with the given output capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Appends one value to the output.
    pub fn push(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => {
                self.out.push(0xf6);
                Ok(())
            }
            Value::Bool(b) => {
                self.out.push(if *b { 0xf5 } else { 0xf4 });
                Ok(())
            }
            Value::Integer(n) => {
                self.push_integer(*n);
                Ok(())
            }
            Value::Bytes(b) => {
                self.push_header(2, b.len() as u64);
                self.out.extend_from_slice(b);
                Ok(())
            }
            Value::Text(s) => {
                self.push_header(3, s.len() as u64);
                self.out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            Value::Array(items) => {
                self.push_header(4, items.len() as u64);
                for item in items {
                    self.push(item)?;
                }
                Ok(())
            }
            Value::Map(pairs) => self.push_map(pairs),
        }
    }

    /// Consumes the encoder and returns the encoded bytes.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.out
    }

    /// Returns the bytes encoded so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    #[allow(clippy::cast_sign_loss)]
    fn push_integer(&mut self, n: i64) {
        if n >= 0 {
            self.push_header(0, n as u64);
        } else {
            // Negative integers carry the argument -1 - n, so -1 encodes
            // as argument 0. For n in [i64::MIN, -1] this never overflows.
            self.push_header(1, (-1i64).wrapping_sub(n) as u64);
        }
    }

    /// Writes a CBOR header (major type + argument) in shortest form.
    #[allow(clippy::cast_possible_truncation)]
    fn push_header(&mut self, major: u8, arg: u64) {
        let mt = major << 5;
        match arg {
            0..=23 => self.out.push(mt | (arg as u8)),
            24..=0xFF => {
                self.out.push(mt | 24);
                self.out.push(arg as u8);
            }
            0x100..=0xFFFF => {
                self.out.push(mt | 25);
                self.out.extend_from_slice(&(arg as u16).to_be_bytes());
            }
            0x1_0000..=0xFFFF_FFFF => {
                self.out.push(mt | 26);
                self.out.extend_from_slice(&(arg as u32).to_be_bytes());
            }
            _ => {
                self.out.push(mt | 27);
                self.out.extend_from_slice(&arg.to_be_bytes());
            }
        }
    }

    fn push_map(&mut self, pairs: &[(Value, Value)]) -> CodecResult<()> {
        // Keys are sorted by their encoded bytes, so each key is encoded
        // once up front and the sorted encodings are spliced back in.
        let mut entries: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            entries.push((to_canonical_cbor(key)?, value));
        }
        entries.sort_by(|a, b| {
            a.0.len()
                .cmp(&b.0.len())
                .then_with(|| a.0.cmp(&b.0))
        });

        self.push_header(5, entries.len() as u64);
        for (key_bytes, value) in entries {
            self.out.extend_from_slice(&key_bytes);
            self.push(value)?;
        }
        Ok(())
    }
}

impl Default for CanonicalEncoder {
    fn default() -> Self {
        Self::new()
    }
}
