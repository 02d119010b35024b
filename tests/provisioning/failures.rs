//! Provisioning failures are fatal and reported with their cause

use crate::common::*;
use eventsink::cql::create_keyspace_cql;
use eventsink::PreparedStatement;
use eventsink::StoreResult;
use std::sync::Arc;

/// An unreachable store fails on the first statement.
#[test]
fn unreachable_store() {
    let store = MemoryStore::new();
    store.set_available(false);

    match SchemaProvisioner::new("ks", "events").provision(&store) {
        Err(Error::Provisioning { statement, source }) => {
            assert_eq!(statement, create_keyspace_cql("ks"));
            assert!(matches!(source, StoreError::Unavailable(_)));
        }
        other => panic!("expected Provisioning error, got {:?}", other),
    }
}

/// A keyspace statement rejected for another reason is fatal.
#[test]
fn rejected_keyspace_ddl() {
    let store = MemoryStore::new();
    store.reject_ddl_containing("CREATE KEYSPACE");

    let err = SchemaProvisioner::new("ks", "events")
        .provision(&store)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Provisioning {
            source: StoreError::Rejected(_),
            ..
        }
    ));
    assert!(!err.is_record_local());
    assert!(store.table_def("ks", "events").is_none());
}

/// After a fault is cleared, provisioning succeeds.
#[test]
fn recovers_after_fault_cleared() {
    let store = MemoryStore::new();
    store.reject_ddl_containing("CREATE TABLE");
    assert!(SchemaProvisioner::new("ks", "events").provision(&store).is_err());

    store.clear_faults();
    assert_eq!(
        SchemaProvisioner::new("ks", "events").provision(&store).unwrap(),
        baseline_columns()
    );
}

/// Registration failure means no sink exists to accept records.
#[test]
fn sink_register_propagates_provisioning_error() {
    let store = Arc::new(MemoryStore::new());
    store.set_available(false);
    let err = Sink::register(store.clone(), &test_config()).unwrap_err();
    assert!(matches!(err, Error::Provisioning { .. }));
}

// ============================================================================
// Column read-back
// ============================================================================

/// Session whose schema metadata never shows the created table
struct BlindSession {
    inner: MemoryStore,
    columns: StoreResult<Vec<Column>>,
}

impl Session for BlindSession {
    fn execute_ddl(&self, cql: &str) -> StoreResult<()> {
        self.inner.execute_ddl(cql)
    }

    fn use_keyspace(&self, keyspace: &str) -> StoreResult<()> {
        self.inner.use_keyspace(keyspace)
    }

    fn refresh_schema(&self) -> StoreResult<()> {
        Ok(())
    }

    fn list_columns(&self, _keyspace: &str, _table: &str) -> StoreResult<Vec<Column>> {
        self.columns.clone()
    }

    fn prepare(&self, cql: &str) -> StoreResult<PreparedStatement> {
        self.inner.prepare(cql)
    }

    fn execute_write(&self, statement: &PreparedStatement, row: &ProjectedRow) -> StoreResult<()> {
        self.inner.execute_write(statement, row)
    }
}

/// A read-back error is a column refresh failure, not a provisioning one.
#[test]
fn column_read_back_error() {
    let session = BlindSession {
        inner: MemoryStore::new(),
        columns: Err(StoreError::UnknownTable("ks.events".into())),
    };
    match SchemaProvisioner::new("ks", "events").provision(&session) {
        Err(Error::ColumnRefresh {
            keyspace,
            table,
            reason,
        }) => {
            assert_eq!(keyspace, "ks");
            assert_eq!(table, "events");
            assert!(reason.contains("ks.events"));
        }
        other => panic!("expected ColumnRefresh, got {:?}", other),
    }
}

/// A table that reports no columns cannot be projected onto.
#[test]
fn empty_column_list() {
    let session = BlindSession {
        inner: MemoryStore::new(),
        columns: Ok(Vec::new()),
    };
    assert!(matches!(
        SchemaProvisioner::new("ks", "events").provision(&session),
        Err(Error::ColumnRefresh { .. })
    ));
}

/// Skipping the refresh on the in-memory store would leave its cached view
/// empty; the provisioner always refreshes.
#[test]
fn stale_cache_is_refreshed() {
    let store = MemoryStore::new();
    store.execute_ddl(&create_keyspace_cql("ks")).unwrap();
    assert!(store.list_columns("ks", "events").is_err());

    let columns = SchemaProvisioner::new("ks", "events")
        .provision(&store)
        .unwrap();
    assert_eq!(store.list_columns("ks", "events").unwrap(), columns.as_slice());
}
