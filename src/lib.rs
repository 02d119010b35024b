//! Eventsink - persist semi-structured events into a fixed CQL table
//!
//! Records whose fields do not match the table are still stored: every
//! undeclared field is folded into one of five typed overflow map columns
//! (`b_`, `d_`, `i_`, `f_`, `s_`), and every declared column is bound,
//! explicitly null when the record has no value for it.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use eventsink::{MemoryStore, Record, Sink, SinkConfig};
//!
//! let store = Arc::new(MemoryStore::new());
//! let sink = Sink::register(store.clone(), &SinkConfig::default())?;
//!
//! let record = Record::new()
//!     .with("@version", "1")
//!     .with("@timestamp", "2016-01-01T00:00:00Z")
//!     .with("message", "hi")
//!     .with("user_id", 42i64);
//! let row = sink.receive(record)?;
//! assert!(row.is_null("host"));
//! assert_eq!(store.row_count("logstash", "logstash"), 1);
//! # Ok::<(), eventsink::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `eventsink-core`: values, records, schema, buckets, rows and errors
//! - `eventsink-storage`: the `Session` trait, CQL rendering, `MemoryStore`
//! - `eventsink-engine`: provisioning, projection, `Sink` and config

pub use eventsink_core::*;
pub use eventsink_engine::*;
pub use eventsink_storage::{cql, MemoryStore, PreparedStatement, Session};
