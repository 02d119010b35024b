//! Provisioning twice, or from many threads, converges on one schema

use crate::common::*;
use eventsink::cql::{create_keyspace_cql, create_table_cql};
use std::sync::{Arc, Barrier};
use std::thread;

/// The baseline DDL text is fixed for compatibility with existing tables.
#[test]
fn baseline_ddl_is_bit_exact() {
    assert_eq!(
        create_keyspace_cql("logstash"),
        "CREATE KEYSPACE IF NOT EXISTS logstash WITH replication = {'class':'SimpleStrategy','replication_factor':'1'};"
    );
    assert_eq!(
        create_table_cql("logstash"),
        "CREATE TABLE IF NOT EXISTS logstash (\n  id uuid PRIMARY KEY, version text, \"timestamp\" timestamp,\n  tags set<text>, type text, message text, path text, host text,\n  b_ map<text,boolean>, d_ map<text,timestamp>, f_ map<text,float>,\n  i_ map<text,bigint>, s_ map<text,text>);"
    );
}

/// Calling provision twice yields the same columns and no error.
#[test]
fn provision_twice_same_columns() {
    let store = MemoryStore::new();
    let provisioner = SchemaProvisioner::new("logstash", "logstash");

    let first = provisioner.provision(&store).unwrap();
    let second = provisioner.provision(&store).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, baseline_columns());
    assert_eq!(store.executed_ddl().len(), 4);
}

/// An existing table keeps its definition; provisioning never alters it.
#[test]
fn existing_table_is_left_alone() {
    let (store, _) = provisioned_store();
    store.execute_ddl("ALTER TABLE ks.events ADD region text").unwrap();
    let before = store.table_def("ks", "events").unwrap();

    SchemaProvisioner::new("ks", "events")
        .provision(&*store)
        .unwrap();

    assert_eq!(store.table_def("ks", "events").unwrap(), before);
}

/// Two tables in one keyspace provision independently.
#[test]
fn tables_share_a_keyspace() {
    let store = MemoryStore::new();
    let a = SchemaProvisioner::new("ks", "a").provision(&store).unwrap();
    let b = SchemaProvisioner::new("ks", "b").provision(&store).unwrap();
    assert_eq!(a, b);
    assert!(store.table_def("ks", "a").is_some());
    assert!(store.table_def("ks", "b").is_some());
}

/// Concurrent first-run provisioning relies on IF NOT EXISTS alone.
#[test]
fn concurrent_provisioning_converges() {
    let store = Arc::new(MemoryStore::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                SchemaProvisioner::new("ks", "events").provision(&*store)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), baseline_columns());
    }
}

/// Sinks registered one after another share the provisioned table.
#[test]
fn re_registering_sink_is_harmless() {
    let store = Arc::new(MemoryStore::new());
    let first = Sink::register(store.clone(), &test_config()).unwrap();
    first.receive(minimal_record()).unwrap();

    let second = Sink::register(store.clone(), &test_config()).unwrap();
    second.receive(minimal_record()).unwrap();

    assert_eq!(first.columns(), second.columns());
    assert_eq!(store.row_count("ks", "events"), 2);
}
