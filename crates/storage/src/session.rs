//! Store session abstraction
//!
//! This module defines the [`Session`] trait that the provisioner and the
//! sink talk to. It hides connection management, statement transport and
//! authentication behind six calls, so a cluster driver and the in-process
//! [`MemoryStore`](crate::MemoryStore) are interchangeable.

use std::sync::Arc;

use eventsink_core::{Column, ProjectedRow, StoreResult};

/// Handle to a statement prepared by a [`Session`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreparedStatement {
    id: u64,
    cql: String,
}

impl PreparedStatement {
    /// Create a handle. Sessions assign `id`; it is only meaningful to the
    /// session that issued it.
    pub fn new(id: u64, cql: impl Into<String>) -> Self {
        PreparedStatement {
            id,
            cql: cql.into(),
        }
    }

    /// Session-assigned identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Statement text
    pub fn cql(&self) -> &str {
        &self.cql
    }
}

/// Connection to a column-family store
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Any per-connection state such as
/// the bound keyspace uses interior mutability.
pub trait Session: Send + Sync {
    /// Execute a schema statement (`CREATE KEYSPACE`, `CREATE TABLE`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`](eventsink_core::StoreError::AlreadyExists)
    /// when the object exists and the statement lacks `IF NOT EXISTS`, or any
    /// other store error when the statement is refused.
    fn execute_ddl(&self, cql: &str) -> StoreResult<()>;

    /// Bind this session to `keyspace` for unqualified table names.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyspace does not exist.
    fn use_keyspace(&self, keyspace: &str) -> StoreResult<()>;

    /// Reload any schema metadata the session caches.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    fn refresh_schema(&self) -> StoreResult<()>;

    /// Columns of `keyspace.table` as currently known to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is unknown to the session's schema view.
    fn list_columns(&self, keyspace: &str, table: &str) -> StoreResult<Vec<Column>>;

    /// Prepare a parameterized write.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is malformed or references unknown
    /// tables or columns.
    fn prepare(&self, cql: &str) -> StoreResult<PreparedStatement>;

    /// Execute a prepared write, binding `row` by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound value does not fit its column or the
    /// store refuses the write.
    fn execute_write(&self, statement: &PreparedStatement, row: &ProjectedRow) -> StoreResult<()>;
}

impl<S: Session + ?Sized> Session for Arc<S> {
    fn execute_ddl(&self, cql: &str) -> StoreResult<()> {
        (**self).execute_ddl(cql)
    }

    fn use_keyspace(&self, keyspace: &str) -> StoreResult<()> {
        (**self).use_keyspace(keyspace)
    }

    fn refresh_schema(&self) -> StoreResult<()> {
        (**self).refresh_schema()
    }

    fn list_columns(&self, keyspace: &str, table: &str) -> StoreResult<Vec<Column>> {
        (**self).list_columns(keyspace, table)
    }

    fn prepare(&self, cql: &str) -> StoreResult<PreparedStatement> {
        (**self).prepare(cql)
    }

    fn execute_write(&self, statement: &PreparedStatement, row: &ProjectedRow) -> StoreResult<()> {
        (**self).execute_write(statement, row)
    }
}
