//! Property tests: row shape, bucket placement, null-fill, id freshness

use crate::common::*;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

const RESERVED: [&str; 3] = ["id", "version", "timestamp"];

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
        prop::collection::vec(any::<i64>().prop_map(Value::Int), 0..3).prop_map(Value::Array),
    ]
}

fn fields() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map("[a-z_]{1,8}", scalar_value(), 0..12)
}

/// Any subset of the baseline columns, in baseline order
fn column_subset() -> impl Strategy<Value = ColumnList> {
    let all: Vec<Column> = baseline_columns().iter().cloned().collect();
    let len = all.len();
    prop::sample::subsequence(all, 0..=len).prop_map(ColumnList::new)
}

fn record_from(fields: &BTreeMap<String, Value>) -> Record {
    let mut record = Record::from(fields.clone());
    record.insert("@version", "1");
    record.insert("@timestamp", "2016-01-01T00:00:00Z");
    record
}

fn project(fields: &BTreeMap<String, Value>, columns: &ColumnList) -> ProjectedRow {
    RecordProjector::new(SequenceIds::new())
        .project(record_from(fields), columns)
        .expect("well-formed record projects")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The row has exactly the declared columns, in declared order.
    #[test]
    fn prop_keys_equal_declared_columns(fields in fields(), columns in column_subset()) {
        let row = project(&fields, &columns);
        let keys: Vec<&str> = row.names().collect();
        let declared: Vec<&str> = columns.names().collect();
        prop_assert_eq!(keys, declared);
    }

    /// An undeclared boolean field `f` is stored under `b_f` and nowhere else.
    #[test]
    fn prop_bool_fields_land_in_bool_bucket(fields in fields()) {
        let columns = baseline_columns();
        let row = project(&fields, &columns);
        let flags = bools(bucket(&row, "b_"));

        for (name, value) in &fields {
            let Value::Bool(flag) = value else { continue };
            if columns.contains(name) {
                continue;
            }
            let key = BucketKind::Bool.key_for(name);
            prop_assert_eq!(flags.get(&key), Some(flag));
            prop_assert!(row.get(name).is_none());
            for kind in BucketKind::ALL.into_iter().filter(|k| *k != BucketKind::Bool) {
                prop_assert!(!bucket(&row, kind.column_name()).contains_key(&kind.key_for(name)));
            }
        }
    }

    /// Every undeclared field is consumed exactly once: non-null fields land
    /// in exactly one bucket, null fields in none.
    #[test]
    fn prop_undeclared_fields_consumed_once(fields in fields()) {
        let columns = baseline_columns();
        let row = project(&fields, &columns);

        for (name, value) in &fields {
            if columns.contains(name) {
                continue;
            }
            let hits = BucketKind::ALL
                .into_iter()
                .filter(|k| bucket(&row, k.column_name()).contains_key(&k.key_for(name)))
                .count();
            prop_assert_eq!(hits, if value.is_null() { 0 } else { 1 });
        }
    }

    /// Declared columns with no value from the record are explicitly null.
    #[test]
    fn prop_unassigned_columns_are_null(fields in fields(), columns in column_subset()) {
        let row = project(&fields, &columns);

        for name in columns.names() {
            let reserved = RESERVED.contains(&name);
            let bucket_column = BucketKind::from_column_name(name).is_some();
            let supplied = fields.get(name).map_or(false, |v| !v.is_null());
            if reserved || bucket_column || supplied {
                continue;
            }
            prop_assert!(row.is_null(name), "{} should be null", name);
        }
    }
}

/// High-iteration sampling: random ids never repeat within a process.
#[test]
fn random_ids_are_fresh() {
    let projector = RecordProjector::new(std::sync::Arc::new(RandomIdGenerator));
    let columns = baseline_columns();

    let mut seen = HashSet::new();
    for _ in 0..20_000 {
        let row = projector.project(minimal_record(), &columns).unwrap();
        match row.get("id") {
            Some(BoundValue::Uuid(id)) => assert!(seen.insert(*id), "duplicate id {}", id),
            other => panic!("id not bound: {:?}", other),
        }
    }
}
