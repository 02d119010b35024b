//! CQL statement rendering and parsing
//!
//! - `render`: statement text the sink emits (baseline DDL, inserts)
//! - `lexer` / `parser`: the subset the in-memory store executes

pub mod lexer;
pub mod parser;
pub mod render;

pub use parser::{parse, Statement, TableRef};
pub use render::{
    create_keyspace_cql, create_table_cql, insert_cql, is_plain_identifier, quote_identifier,
    DEFAULT_REPLICATION,
};
