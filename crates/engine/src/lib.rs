//! Sink engine for eventsink
//!
//! This crate ties the lower layers together:
//! - SchemaProvisioner: creates keyspace and table, reads back the columns
//! - RecordProjector: record to column-exact row, with typed overflow buckets
//! - Sink: provisioned context built once, then `receive` per record
//! - SinkConfig: `eventsink.toml` loading and validation
//!
//! Everything here is written against the `Session` trait; no store is
//! assumed beyond it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod id;
pub mod projector;
pub mod provision;
pub mod sink;

pub use config::{SinkConfig, CONFIG_FILE_NAME, DEFAULT_KEYSPACE, DEFAULT_TABLE};
pub use id::{IdGenerator, RandomIdGenerator};
pub use projector::{parse_timestamp, RecordProjector};
pub use provision::SchemaProvisioner;
pub use sink::{Sink, SinkStats};
