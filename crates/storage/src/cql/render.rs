//! CQL statement text emitted by the sink
//!
//! The baseline DDL is a compatibility contract with existing deployments
//! and must stay byte-for-byte stable.

use eventsink_core::ColumnList;

/// Replication used when the sink creates its keyspace.
///
/// Single datacenter, one replica. Deployments needing multi-DC
/// replication create or alter the keyspace themselves.
pub const DEFAULT_REPLICATION: &str = "{'class':'SimpleStrategy','replication_factor':'1'}";

/// `CREATE KEYSPACE IF NOT EXISTS` for the sink's keyspace
pub fn create_keyspace_cql(keyspace: &str) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {};",
        keyspace, DEFAULT_REPLICATION
    )
}

/// `CREATE TABLE IF NOT EXISTS` with the baseline schema
pub fn create_table_cql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  \
         id uuid PRIMARY KEY, version text, \"timestamp\" timestamp,\n  \
         tags set<text>, type text, message text, path text, host text,\n  \
         b_ map<text,boolean>, d_ map<text,timestamp>, f_ map<text,float>,\n  \
         i_ map<text,bigint>, s_ map<text,text>);",
        table
    )
}

/// `INSERT` over every declared column, in declared order, with positional
/// bind markers
pub fn insert_cql(table: &str, columns: &ColumnList) -> String {
    let names: Vec<String> = columns.names().map(quote_identifier).collect();
    let markers = vec!["?"; names.len()];
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        names.join(", "),
        markers.join(", ")
    )
}

/// Quote an identifier so that keywords and mixed case survive
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Whether `name` is usable unquoted: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
