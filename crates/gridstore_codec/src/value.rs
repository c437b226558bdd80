//! Materialized record value type.

use std::cmp::Ordering;

/// A fully materialized record value.
///
/// This is the in-memory object form of a stored key or value, as opposed
/// to the encoded wire form held by an
/// [`EncodedBlob`](crate::blob::EncodedBlob). The variant set mirrors the
/// canonical CBOR profile gridstore stores records in: floats are
/// intentionally absent, which is also what lets `Value` implement `Eq`
/// and `Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (full i64 range).
    Integer(i64),
    /// Byte string.
    Bytes(Vec<u8>),
    /// Text string (UTF-8).
    Text(String),
    /// Array of values.
    Array(Vec<Value>),
    /// Map of key-value pairs, kept in canonical key order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Creates a map value with keys sorted into canonical order.
    ///
    /// Canonical order is the bytewise order of the keys' canonical CBOR
    /// encodings (length-first, then lexicographic).
    #[must_use]
    pub fn map(mut pairs: Vec<(Value, Value)>) -> Self {
        pairs.sort_by(|a, b| a.0.canonical_cmp(&b.0));
        Value::Map(pairs)
    }

    /// Compares two values by their canonical wire ordering.
    ///
    /// Equivalent to comparing the canonical encodings of the two values
    /// without producing them: major type first, then encoded length,
    /// then content.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.wire_class()
            .cmp(&other.wire_class())
            .then_with(|| match (self, other) {
                (Value::Null, Value::Null) => Ordering::Equal,
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                (Value::Integer(a), Value::Integer(b)) => cmp_integer_canonical(*a, *b),
                (Value::Bytes(a), Value::Bytes(b)) => cmp_length_first(a, b),
                (Value::Text(a), Value::Text(b)) => cmp_length_first(a.as_bytes(), b.as_bytes()),
                (Value::Array(a), Value::Array(b)) => a
                    .len()
                    .cmp(&b.len())
                    .then_with(|| cmp_elementwise(a.iter(), b.iter())),
                (Value::Map(a), Value::Map(b)) => a.len().cmp(&b.len()).then_with(|| {
                    cmp_elementwise(
                        a.iter().flat_map(|(k, v)| [k, v]),
                        b.iter().flat_map(|(k, v)| [k, v]),
                    )
                }),
                // Distinct variants never share a wire class.
                _ => Ordering::Equal,
            })
    }

    /// Wire-level ordering class: the CBOR major type of this value.
    fn wire_class(&self) -> u8 {
        match self {
            Value::Integer(n) if *n >= 0 => 0,
            Value::Integer(_) => 1,
            Value::Bytes(_) => 2,
            Value::Text(_) => 3,
            Value::Array(_) => 4,
            Value::Map(_) => 5,
            Value::Bool(_) | Value::Null => 7,
        }
    }

    /// Short human-readable name of this value's kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
        }
    }

    /// Returns true if this value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean content, if this is a bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the byte-string content, if this is a byte string.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text content, if this is a text string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a text key in this map value.
    ///
    /// Returns `None` if this is not a map or the key is absent.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_text() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Looks up an element by position in this array value.
    ///
    /// Returns `None` if this is not an array or the index is out of range.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }
}

/// Compares integers by their canonical encodings.
///
/// Sign classes are already separated by the wire class comparison; within
/// a sign class, canonical order is encoded-length-first, then numeric.
fn cmp_integer_canonical(a: i64, b: i64) -> Ordering {
    let (arg_a, arg_b) = if a >= 0 && b >= 0 {
        (a.unsigned_abs(), b.unsigned_abs())
    } else {
        // Negative integers encode the argument -1 - n.
        (
            (-1i64).wrapping_sub(a).unsigned_abs(),
            (-1i64).wrapping_sub(b).unsigned_abs(),
        )
    };
    header_arg_len(arg_a)
        .cmp(&header_arg_len(arg_b))
        .then_with(|| arg_a.cmp(&arg_b))
}

/// Encoded length in bytes of a CBOR header with the given argument.
pub(crate) fn header_arg_len(arg: u64) -> usize {
    match arg {
        0..=23 => 1,
        24..=0xFF => 2,
        0x100..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

/// Length-first, then lexicographic byte comparison.
fn cmp_length_first(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Element-by-element canonical comparison of two equal-length sequences.
fn cmp_elementwise<'a, I, J>(a: I, b: J) -> Ordering
where
    I: Iterator<Item = &'a Value>,
    J: Iterator<Item = &'a Value>,
{
    for (av, bv) in a.zip(b) {
        let ord = av.canonical_cmp(bv);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}
