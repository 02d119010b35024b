//! The event sink
//!
//! A [`Sink`] is the immutable per-process context: the session handle, the
//! provisioned column list, the prepared insert and the projector. It is
//! built once by [`Sink::register`] and then shared by reference (or `Arc`)
//! with every worker calling [`Sink::receive`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use eventsink_core::{ColumnList, Error, ProjectedRow, Record, Result};
use eventsink_storage::cql::insert_cql;
use eventsink_storage::{PreparedStatement, Session};

use crate::config::SinkConfig;
use crate::id::{IdGenerator, RandomIdGenerator};
use crate::projector::RecordProjector;
use crate::provision::SchemaProvisioner;

/// Counters kept by a [`Sink`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Rows written
    pub written: u64,
    /// Records that failed projection and were never written
    pub rejected: u64,
    /// Rows the store refused
    pub failed: u64,
}

/// Provisioned, ready-to-write sink for one keyspace/table
pub struct Sink {
    session: Arc<dyn Session>,
    keyspace: String,
    table: String,
    columns: ColumnList,
    statement: PreparedStatement,
    projector: RecordProjector,
    written: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

impl Sink {
    /// Provision the target table and prepare the insert statement.
    ///
    /// Must succeed before any record is accepted. Uses random (v4) ids.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `config` does not validate
    /// - [`Error::Provisioning`] / [`Error::ColumnRefresh`] from provisioning
    /// - [`Error::Provisioning`] if the insert statement cannot be prepared
    pub fn register(session: Arc<dyn Session>, config: &SinkConfig) -> Result<Sink> {
        Sink::register_with_ids(session, config, Arc::new(RandomIdGenerator))
    }

    /// Like [`Sink::register`], drawing row ids from `ids`
    pub fn register_with_ids(
        session: Arc<dyn Session>,
        config: &SinkConfig,
        ids: Arc<dyn IdGenerator>,
    ) -> Result<Sink> {
        config.validate()?;

        let columns = SchemaProvisioner::new(&config.keyspace, &config.table)
            .provision(session.as_ref())?;

        let cql = insert_cql(&config.table, &columns);
        let statement = session
            .prepare(&cql)
            .map_err(|source| Error::Provisioning {
                statement: cql.clone(),
                source,
            })?;

        info!(
            target: "eventsink::sink",
            keyspace = %config.keyspace,
            table = %config.table,
            columns = columns.len(),
            statement = statement.id(),
            "Sink registered"
        );

        Ok(Sink {
            session,
            keyspace: config.keyspace.clone(),
            table: config.table.clone(),
            columns,
            statement,
            projector: RecordProjector::from_config(config, ids),
            written: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    /// Project `record` and write it as one row.
    ///
    /// Returns the row that was written.
    ///
    /// # Errors
    ///
    /// - [`Error::Projection`] if the record is malformed; nothing is written
    /// - [`Error::Write`] if the store refuses the row
    ///
    /// Both are record-local: the sink stays usable.
    pub fn receive(&self, record: Record) -> Result<ProjectedRow> {
        let row = match self.projector.project(record, &self.columns) {
            Ok(row) => row,
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                debug!(target: "eventsink::sink", error = %e, "Record rejected");
                return Err(e.into());
            }
        };

        if let Err(e) = self.session.execute_write(&self.statement, &row) {
            self.failed.fetch_add(1, Ordering::Relaxed);
            warn!(
                target: "eventsink::sink",
                table = %self.table,
                error = %e,
                "Write rejected by store"
            );
            return Err(Error::Write(e));
        }

        self.written.fetch_add(1, Ordering::Relaxed);
        debug!(target: "eventsink::sink", table = %self.table, "Row written");
        Ok(row)
    }

    /// Declared columns, in table order
    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    /// Target keyspace
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Prepared insert statement
    pub fn statement(&self) -> &PreparedStatement {
        &self.statement
    }

    /// The projector used by [`Sink::receive`]
    pub fn projector(&self) -> &RecordProjector {
        &self.projector
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> SinkStats {
        SinkStats {
            written: self.written.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("keyspace", &self.keyspace)
            .field("table", &self.table)
            .field("columns", &self.columns.len())
            .field("statement", &self.statement)
            .field("stats", &self.stats())
            .finish()
    }
}
