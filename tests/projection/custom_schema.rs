//! Projection against tables that differ from the baseline

use crate::common::*;
use eventsink::cql::create_keyspace_cql;
use std::sync::Arc;

/// Store holding keyspace `ks` and a table created by `ddl`
fn store_with_table(ddl: &str) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store.execute_ddl(&create_keyspace_cql("ks")).unwrap();
    store.execute_ddl(ddl).unwrap();
    store
}

// ============================================================================
// Operator-added columns
// ============================================================================

/// A column added by hand is read back and honored as declared.
#[test]
fn added_column_is_declared() {
    let (store, _) = provisioned_store();
    store.execute_ddl("ALTER TABLE ks.events ADD level int").unwrap();

    let columns = SchemaProvisioner::new("ks", "events")
        .provision(&*store)
        .unwrap();
    assert_eq!(columns.len(), 14);
    assert_eq!(columns.get("level").unwrap().column_type, ColumnType::Int);

    let row = RecordProjector::new(SequenceIds::new())
        .project(minimal_record().with("level", 3i64), &columns)
        .unwrap();
    assert_keys_match(&row, &columns);
    assert_eq!(row.get("level"), Some(&BoundValue::Field(Value::Int(3))));
    assert!(ints(bucket(&row, "i_")).is_empty());
}

/// Written through a sink, the custom column is stored.
#[test]
fn added_column_round_trips_through_sink() {
    let (store, _) = provisioned_store();
    store.execute_ddl("ALTER TABLE ks.events ADD level int").unwrap();

    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new()).unwrap();
    sink.receive(minimal_record().with("level", 5i64)).unwrap();
    sink.receive(minimal_record()).unwrap();

    let rows = store.rows("ks", "events");
    assert_eq!(rows.len(), 2);
    let levels: Vec<&BoundValue> = rows.iter().map(|r| &r["level"]).collect();
    assert!(levels.contains(&&BoundValue::Field(Value::Int(5))));
    assert!(levels.contains(&&BoundValue::Null));
}

// ============================================================================
// Tables without buckets
// ============================================================================

/// Without bucket columns, undeclared fields are discarded and the row
/// still has exactly the declared keys.
#[test]
fn buckets_discarded_without_columns() {
    let store = store_with_table(
        r#"CREATE TABLE ks.events (id uuid PRIMARY KEY, message text, "timestamp" timestamp)"#,
    );
    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new()).unwrap();
    assert_eq!(sink.columns().len(), 3);

    let row = sink.receive(scenario_record()).unwrap();
    assert_keys_match(&row, sink.columns());
    assert_eq!(row.get("message"), Some(&BoundValue::Field(Value::from("hi"))));
    assert_eq!(
        row.get("timestamp"),
        Some(&BoundValue::Timestamp(ts("2016-01-01T00:00:00Z")))
    );
    assert!(row.get("version").is_none());
    assert!(row.get("b_").is_none());
    assert_eq!(store.row_count("ks", "events"), 1);
}

/// A declared column named like a bucket is filled from the same-named
/// input field, never from the bucket.
#[test]
fn bucket_named_column_takes_input_value() {
    let store = store_with_table(
        "CREATE TABLE ks.events (id uuid PRIMARY KEY, s_ text, b_ map<text,boolean>)",
    );
    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new()).unwrap();

    let row = sink
        .receive(minimal_record().with("s_", "raw").with("note", "dropped").with("ok", true))
        .unwrap();
    assert_eq!(row.get("s_"), Some(&BoundValue::Field(Value::from("raw"))));
    assert_eq!(bools(bucket(&row, "b_")).get("b_ok"), Some(&true));
}

/// Reserved outputs without a declared column are bucketed, overwriting
/// same-named input fields.
#[test]
fn undeclared_reserved_outputs_land_in_buckets() {
    let store = store_with_table(
        "CREATE TABLE ks.events (id uuid PRIMARY KEY, s_ map<text,text>, d_ map<text,timestamp>)",
    );
    let ids = SequenceIds::new();
    let sink = Sink::register_with_ids(store.clone(), &test_config(), ids.clone()).unwrap();

    let row = sink
        .receive(minimal_record().with("version", "user-supplied"))
        .unwrap();
    assert_keys_match(&row, sink.columns());
    assert_eq!(row.get("id"), Some(&BoundValue::Uuid(Uuid::from_u128(1))));

    let text = texts(bucket(&row, "s_"));
    assert_eq!(text.get("s_version").map(String::as_str), Some("1"));
    assert!(!text.contains_key("s_id"));
    assert_eq!(
        timestamps(bucket(&row, "d_")).get("d_timestamp"),
        Some(&ts("2016-01-01T00:00:00Z"))
    );
    assert_eq!(ids.issued(), 1);
    assert_eq!(store.row_count("ks", "events"), 1);
}

/// Without an `id` column the generated id is kept as text.
#[test]
fn undeclared_id_is_kept_as_text() {
    let store = store_with_table("CREATE TABLE ks.events (message text PRIMARY KEY, s_ map<text,text>)");
    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new()).unwrap();

    let row = sink
        .receive(minimal_record().with("message", "m").with("id", 99i64))
        .unwrap();
    let text = texts(bucket(&row, "s_"));
    assert_eq!(text.get("s_id"), Some(&Uuid::from_u128(1).to_string()));
    assert_eq!(text.get("s_version").map(String::as_str), Some("1"));
    assert_eq!(store.row_count("ks", "events"), 1);
}

/// A primary key the projector does not generate stays null and the
/// store refuses the write.
#[test]
fn foreign_primary_key_write_fails() {
    let store = store_with_table("CREATE TABLE ks.events (event_id uuid PRIMARY KEY, message text)");
    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new()).unwrap();

    let err = sink.receive(scenario_record()).unwrap_err();
    assert!(matches!(err, Error::Write(StoreError::Rejected(_))));
    assert_eq!(store.row_count("ks", "events"), 0);
}
