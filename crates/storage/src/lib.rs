//! Store session layer for eventsink
//!
//! This crate provides:
//! - Session: the store capability the provisioner and sink are written against
//! - cql: baseline DDL and insert rendering, plus a parser for the CQL subset
//! - MemoryStore: in-process Session over a parsed catalog (tests, CLI, benches)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cql;
pub mod memory;
pub mod session;

pub use memory::{KeyspaceDef, MemoryStore, StoredRow, TableDef};
pub use session::{PreparedStatement, Session};
