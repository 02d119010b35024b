//! One sink shared by many workers

use crate::common::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

/// Workers share one sink through `Arc` with no extra locking.
#[test]
fn shared_sink_many_writers() {
    let (store, sink) = test_sink();
    let sink = Arc::new(sink);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for i in 0..250i64 {
                    sink.receive(minimal_record().with("worker", worker as i64).with("i", i))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.row_count("ks", "events"), 2000);
    assert_eq!(sink.stats().written, 2000);

    let ids: HashSet<String> = store
        .rows("ks", "events")
        .iter()
        .map(|row| row["id"].to_json().to_string())
        .collect();
    assert_eq!(ids.len(), 2000);
}

/// Failing records on one worker do not disturb the others.
#[test]
fn mixed_good_and_bad_records() {
    let (store, sink) = test_sink();
    let sink = Arc::new(sink);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                for i in 0..100 {
                    let mut record = minimal_record().with("i", i as i64);
                    if worker % 2 == 1 && i % 10 == 0 {
                        record.remove("@version");
                    }
                    let _ = sink.receive(record);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = sink.stats();
    assert_eq!(stats.rejected, 20);
    assert_eq!(stats.written, 380);
    assert_eq!(store.row_count("ks", "events"), 380);
}
