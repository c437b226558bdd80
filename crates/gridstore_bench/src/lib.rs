//! Benchmark utilities for gridstore.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use gridstore_codec::Value;
use rand::Rng;

/// Generates a flat record with `fields` random integer fields.
#[must_use]
pub fn flat_record(fields: usize) -> Value {
    let mut rng = rand::thread_rng();
    Value::map(
        (0..fields)
            .map(|i| {
                (
                    Value::Text(format!("field_{i}")),
                    Value::Integer(rng.gen()),
                )
            })
            .collect(),
    )
}

/// Generates a nested record `depth` maps deep with `width` fields per
/// level; the probe path `p.p.p...` leads to a leaf integer.
#[must_use]
pub fn nested_record(depth: usize, width: usize) -> Value {
    let mut rng = rand::thread_rng();
    let mut current = Value::Integer(rng.gen());
    for _ in 0..depth {
        let mut pairs: Vec<(Value, Value)> = (1..width)
            .map(|i| (Value::Text(format!("sibling_{i}")), Value::Integer(rng.gen())))
            .collect();
        pairs.push((Value::Text("p".to_string()), current));
        current = Value::map(pairs);
    }
    current
}

/// Dotted probe path reaching the leaf of [`nested_record`].
#[must_use]
pub fn nested_probe_path(depth: usize) -> String {
    vec!["p"; depth].join(".")
}
