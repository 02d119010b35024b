//! Schema provisioning
//!
//! Ensures the target keyspace and table exist and reads back the
//! authoritative column list. Every step relies on the store's own
//! `IF NOT EXISTS` semantics, so concurrent provisioning from several
//! processes needs no locking. Stores without those semantics must be
//! provisioned by one process at a time.

use tracing::{debug, info};

use eventsink_core::{ColumnList, Error, Result, StoreError};
use eventsink_storage::cql::{create_keyspace_cql, create_table_cql};
use eventsink_storage::Session;

/// Provisions one keyspace/table pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaProvisioner {
    keyspace: String,
    table: String,
}

impl SchemaProvisioner {
    /// Create a provisioner for `keyspace.table`
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        SchemaProvisioner {
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }

    /// Target keyspace
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create keyspace and table if absent, then read back the live columns.
    ///
    /// Idempotent: a second call against the same store issues the same
    /// statements and returns the same column list. Binds `session` to the
    /// keyspace as a side effect.
    ///
    /// # Errors
    ///
    /// - [`Error::Provisioning`] if a statement is rejected for a reason other
    ///   than "already exists", or the store is unreachable
    /// - [`Error::ColumnRefresh`] if the columns cannot be read back, or the
    ///   table reports none
    pub fn provision(&self, session: &dyn Session) -> Result<ColumnList> {
        let keyspace_cql = create_keyspace_cql(&self.keyspace);
        self.run_ddl(session, &keyspace_cql)?;

        session
            .use_keyspace(&self.keyspace)
            .map_err(|source| Error::Provisioning {
                statement: format!("USE {}", self.keyspace),
                source,
            })?;

        let table_cql = create_table_cql(&self.table);
        self.run_ddl(session, &table_cql)?;

        // Drivers may cache metadata from before the table existed
        session
            .refresh_schema()
            .map_err(|e| self.refresh_error(e.to_string()))?;

        let columns = session
            .list_columns(&self.keyspace, &self.table)
            .map_err(|e| self.refresh_error(e.to_string()))?;
        if columns.is_empty() {
            return Err(self.refresh_error("table reports no columns".to_string()));
        }

        let columns = ColumnList::new(columns);
        info!(
            target: "eventsink::provision",
            keyspace = %self.keyspace,
            table = %self.table,
            columns = columns.len(),
            "Schema ready"
        );
        Ok(columns)
    }

    fn run_ddl(&self, session: &dyn Session, cql: &str) -> Result<()> {
        match session.execute_ddl(cql) {
            Ok(()) => {
                debug!(target: "eventsink::provision", statement = cql, "DDL applied");
                Ok(())
            }
            Err(StoreError::AlreadyExists(what)) => {
                debug!(target: "eventsink::provision", existing = %what, "DDL target already exists");
                Ok(())
            }
            Err(source) => Err(Error::Provisioning {
                statement: cql.to_string(),
                source,
            }),
        }
    }

    fn refresh_error(&self, reason: String) -> Error {
        Error::ColumnRefresh {
            keyspace: self.keyspace.clone(),
            table: self.table.clone(),
            reason,
        }
    }
}
