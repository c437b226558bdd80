//! End-to-end exercise of entries the way an index-build pass uses them:
//! one entry per stored record, several attribute probes per entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gridstore_codec::{
    CodecResult, EncodedBlob, StandardCodec, Value, WireCodec,
};
use gridstore_query::{AttributePath, Extractors, QueryEntry, RecordForm};

struct CountingCodec {
    inner: StandardCodec,
    materializations: AtomicUsize,
}

impl WireCodec for CountingCodec {
    fn supports_direct_field_access(&self, blob: &EncodedBlob) -> bool {
        self.inner.supports_direct_field_access(blob)
    }

    fn materialize(&self, blob: &EncodedBlob) -> CodecResult<Value> {
        self.materializations.fetch_add(1, Ordering::SeqCst);
        self.inner.materialize(blob)
    }

    fn encode(&self, value: &Value) -> CodecResult<EncodedBlob> {
        self.inner.encode(value)
    }
}

fn person(name: &str, city: &str, age: i64) -> Value {
    Value::map(vec![
        (Value::Text("name".into()), Value::Text(name.into())),
        (
            Value::Text("address".into()),
            Value::map(vec![(Value::Text("city".into()), Value::Text(city.into()))]),
        ),
        (Value::Text("age".into()), Value::Integer(age)),
    ])
}

fn stored_records(codec: &dyn WireCodec) -> Vec<(EncodedBlob, EncodedBlob)> {
    [
        ("user:1", person("alice", "lisbon", 30)),
        ("user:2", person("bob", "porto", 25)),
        ("user:3", person("carol", "lisbon", 41)),
    ]
    .into_iter()
    .map(|(key, value)| {
        (
            codec.encode(&Value::Text(key.into())).unwrap(),
            codec.encode(&value).unwrap(),
        )
    })
    .collect()
}

#[test]
fn index_build_pass_groups_records_without_materializing_them() {
    let codec = Arc::new(CountingCodec {
        inner: StandardCodec::new(),
        materializations: AtomicUsize::new(0),
    });
    let extractors = Arc::new(Extractors::empty());
    let city_path = AttributePath::value("address.city").unwrap();
    let age_path = AttributePath::value("age").unwrap();

    // One entry per record; each record is probed for two attributes.
    let mut by_city: HashMap<Value, Vec<Value>> = HashMap::new();
    for (key_blob, value_blob) in stored_records(codec.as_ref()) {
        let entry = QueryEntry::new(
            Arc::clone(&codec) as Arc<dyn WireCodec>,
            Some(RecordForm::Encoded(key_blob)),
            RecordForm::Encoded(value_blob),
            Arc::clone(&extractors),
        )
        .unwrap();

        let city = entry.attribute(&city_path).unwrap();
        let age = entry.attribute(&age_path).unwrap();
        assert!(age.as_integer().is_some());

        by_city
            .entry((*city).clone())
            .or_default()
            .push((*entry.key().unwrap()).clone());
    }

    let lisbon = &by_city[&Value::Text("lisbon".into())];
    assert_eq!(
        lisbon,
        &vec![Value::Text("user:1".into()), Value::Text("user:3".into())]
    );
    assert_eq!(
        by_city[&Value::Text("porto".into())],
        vec![Value::Text("user:2".into())]
    );

    // Both attribute probes ran on the wire form; only the keys were
    // materialized (one conversion each, for grouping output).
    assert_eq!(codec.materializations.load(Ordering::SeqCst), 3);
}

#[test]
fn repeated_probes_of_one_entry_hit_the_caches() {
    let codec = Arc::new(CountingCodec {
        inner: StandardCodec::new(),
        materializations: AtomicUsize::new(0),
    });
    let (key_blob, value_blob) = stored_records(codec.as_ref()).remove(0);
    let entry = QueryEntry::new(
        Arc::clone(&codec) as Arc<dyn WireCodec>,
        Some(RecordForm::Encoded(key_blob)),
        RecordForm::Encoded(value_blob),
        Arc::new(Extractors::empty()),
    )
    .unwrap();

    let path = AttributePath::value("name").unwrap();
    let first = entry.attribute(&path).unwrap();
    for _ in 0..10 {
        assert!(Arc::ptr_eq(&first, &entry.attribute(&path).unwrap()));
    }
    for _ in 0..10 {
        let _ = entry.key().unwrap();
    }
    assert_eq!(codec.materializations.load(Ordering::SeqCst), 1);
}

#[test]
fn warm_entry_is_shareable_across_threads() {
    let codec: Arc<dyn WireCodec> = Arc::new(StandardCodec::new());
    let (key_blob, value_blob) = stored_records(codec.as_ref()).remove(0);
    let entry = QueryEntry::new(
        Arc::clone(&codec),
        Some(RecordForm::Encoded(key_blob)),
        RecordForm::Encoded(value_blob),
        Arc::new(Extractors::empty()),
    )
    .unwrap();

    // Warm the caches from the owning task.
    let city_path = AttributePath::value("address.city").unwrap();
    let city = entry.attribute(&city_path).unwrap();
    let key = entry.key().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(entry.attribute(&city_path).unwrap(), city);
                assert_eq!(entry.key().unwrap(), key);
            });
        }
    });
}

#[test]
fn entries_from_independent_passes_compare_by_key() {
    let codec: Arc<dyn WireCodec> = Arc::new(StandardCodec::new());
    let extractors = Arc::new(Extractors::empty());

    let build = |value: Value| {
        QueryEntry::new(
            Arc::clone(&codec),
            Some(RecordForm::Encoded(
                codec.encode(&Value::Text("user:1".into())).unwrap(),
            )),
            RecordForm::Materialized(value),
            Arc::clone(&extractors),
        )
        .unwrap()
    };

    // Same key seen by two passes with different value snapshots: still
    // the same cursor position.
    let older = build(person("alice", "lisbon", 30));
    let newer = build(person("alice", "berlin", 31));
    assert_eq!(older, newer);

    let mut seen = std::collections::HashSet::new();
    assert!(seen.insert(older));
    assert!(!seen.insert(newer));
}
