//! Shared test utilities for all integration test suites.
//!
//! Import from a suite's main.rs with
//! `#[path = "../common/mod.rs"] mod common;`.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use eventsink::{
    baseline_columns, BoundValue, Bucket, BucketKind, Column, ColumnList, ColumnType, Error,
    IdGenerator, MemoryStore, ProjectedRow, ProjectionError, RandomIdGenerator, Record,
    RecordProjector, SchemaProvisioner, Session, Sink, SinkConfig, StoreError, Value,
};
pub use uuid::Uuid;

// ============================================================================
// Id generators
// ============================================================================

/// Hands out 1, 2, 3, ... as UUIDs so rows are predictable
#[derive(Debug, Default)]
pub struct SequenceIds {
    next: AtomicU64,
}

impl SequenceIds {
    pub fn new() -> Arc<Self> {
        Arc::new(SequenceIds::default())
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequenceIds {
    fn new_id(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(n as u128)
    }
}

// ============================================================================
// Records
// ============================================================================

/// Parse an RFC 3339 timestamp
pub fn ts(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

/// A record carrying only the two reserved fields
pub fn minimal_record() -> Record {
    Record::new()
        .with("@version", "1")
        .with("@timestamp", "2016-01-01T00:00:00Z")
}

/// The documented example record
pub fn scenario_record() -> Record {
    Record::from_json_str(
        r#"{"@version":"1","@timestamp":"2016-01-01T00:00:00Z","message":"hi","custom_flag":true,"user_id":42}"#,
    )
    .expect("scenario record parses")
}

// ============================================================================
// Stores and sinks
// ============================================================================

/// A store with the baseline table provisioned as `ks.events`
pub fn provisioned_store() -> (Arc<MemoryStore>, ColumnList) {
    let store = Arc::new(MemoryStore::new());
    let columns = SchemaProvisioner::new("ks", "events")
        .provision(&*store)
        .expect("provisioning a fresh store");
    (store, columns)
}

/// Config targeting `ks.events`
pub fn test_config() -> SinkConfig {
    SinkConfig {
        keyspace: "ks".to_string(),
        table: "events".to_string(),
        ..SinkConfig::default()
    }
}

/// A registered sink over a fresh store, with sequential ids
pub fn test_sink() -> (Arc<MemoryStore>, Sink) {
    let store = Arc::new(MemoryStore::new());
    let sink = Sink::register_with_ids(store.clone(), &test_config(), SequenceIds::new())
        .expect("register sink");
    (store, sink)
}

// ============================================================================
// Row inspection
// ============================================================================

/// Bucket bound to `column`, panicking if it is anything else
pub fn bucket<'a>(row: &'a ProjectedRow, column: &str) -> &'a Bucket {
    row.get(column)
        .and_then(BoundValue::as_bucket)
        .unwrap_or_else(|| panic!("{} is not a bucket: {:?}", column, row.get(column)))
}

/// Assert that the row's keys are exactly the declared columns, in order
pub fn assert_keys_match(row: &ProjectedRow, columns: &ColumnList) {
    let keys: Vec<&str> = row.names().collect();
    let declared: Vec<&str> = columns.names().collect();
    assert_eq!(keys, declared, "row keys must equal declared columns");
}

/// Bool bucket contents as a plain map
pub fn bools(bucket: &Bucket) -> BTreeMap<String, bool> {
    match bucket {
        Bucket::Bool(m) => m.clone(),
        other => panic!("expected bool bucket, got {:?}", other),
    }
}

/// Int bucket contents as a plain map
pub fn ints(bucket: &Bucket) -> BTreeMap<String, i64> {
    match bucket {
        Bucket::Int(m) => m.clone(),
        other => panic!("expected int bucket, got {:?}", other),
    }
}

/// Text bucket contents as a plain map
pub fn texts(bucket: &Bucket) -> BTreeMap<String, String> {
    match bucket {
        Bucket::Text(m) => m.clone(),
        other => panic!("expected text bucket, got {:?}", other),
    }
}

/// Timestamp bucket contents as a plain map
pub fn timestamps(bucket: &Bucket) -> BTreeMap<String, DateTime<Utc>> {
    match bucket {
        Bucket::Timestamp(m) => m.clone(),
        other => panic!("expected timestamp bucket, got {:?}", other),
    }
}
