//! MemoryStore: in-process store session
//!
//! This module implements the [`Session`] trait over an in-memory catalog
//! and row map, using:
//! - the `cql` parser for the statement subset the sink emits
//! - `parking_lot::RwLock` for thread-safe access
//! - `AtomicU64` for prepared statement ids
//!
//! # Design Notes
//!
//! - **Cached schema view**: `list_columns` reads a snapshot of the catalog
//!   that only `refresh_schema` updates, like drivers that load metadata at
//!   connect time. DDL and `prepare` always see the live catalog.
//! - **Upserts**: rows are keyed by primary key; a second write with the same
//!   key replaces the first.
//! - **Fault injection**: `set_available(false)` and `reject_ddl_containing`
//!   let tests drive the failure paths of callers.

mod catalog;
mod validate;

pub use catalog::{KeyspaceDef, TableDef};

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use eventsink_core::{BoundValue, Column, ProjectedRow, StoreError, StoreResult};

use crate::cql::{parse, Statement, TableRef};
use crate::session::{PreparedStatement, Session};
use catalog::Catalog;

/// A stored row, keyed by column name
pub type StoredRow = BTreeMap<String, BoundValue>;

#[derive(Debug, Clone)]
struct PreparedInsert {
    keyspace: String,
    table: String,
    columns: Vec<String>,
}

type TableKey = (String, String);

/// In-process implementation of [`Session`]
///
/// Thread-safe through `parking_lot::RwLock` and atomics; share it with
/// `Arc<MemoryStore>`.
#[derive(Debug)]
pub struct MemoryStore {
    /// Live schema
    catalog: RwLock<Catalog>,
    /// Schema view served to `list_columns`
    cached: RwLock<Catalog>,
    /// Keyspace bound by `use_keyspace`
    keyspace: RwLock<Option<String>>,
    rows: RwLock<HashMap<TableKey, BTreeMap<String, StoredRow>>>,
    prepared: RwLock<HashMap<u64, PreparedInsert>>,
    next_statement: AtomicU64,
    /// Every DDL statement received, in order
    ddl_log: RwLock<Vec<String>>,
    available: AtomicBool,
    rejected_patterns: RwLock<Vec<String>>,
    options: BTreeMap<String, String>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_options(BTreeMap::new())
    }

    /// Create an empty store carrying connection options.
    ///
    /// The options are kept for inspection only; the in-process store has
    /// nothing to connect to.
    pub fn with_options(options: BTreeMap<String, String>) -> Self {
        if !options.is_empty() {
            debug!(target: "eventsink::memory", options = ?options, "Memory store created with options");
        }
        Self {
            catalog: RwLock::new(Catalog::default()),
            cached: RwLock::new(Catalog::default()),
            keyspace: RwLock::new(None),
            rows: RwLock::new(HashMap::new()),
            prepared: RwLock::new(HashMap::new()),
            next_statement: AtomicU64::new(1),
            ddl_log: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            rejected_patterns: RwLock::new(Vec::new()),
            options,
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Connection options this store was created with
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Keyspace currently bound by `use_keyspace`
    pub fn current_keyspace(&self) -> Option<String> {
        self.keyspace.read().clone()
    }

    /// Replication options of a keyspace in the live catalog
    pub fn keyspace_replication(&self, keyspace: &str) -> Option<BTreeMap<String, String>> {
        self.catalog
            .read()
            .keyspace(keyspace)
            .map(|ks| ks.replication.clone())
    }

    /// Table definition from the live catalog
    pub fn table_def(&self, keyspace: &str, table: &str) -> Option<TableDef> {
        self.catalog.read().table(keyspace, table).ok().cloned()
    }

    /// Every DDL statement received so far, including rejected ones
    pub fn executed_ddl(&self) -> Vec<String> {
        self.ddl_log.read().clone()
    }

    /// Number of rows stored in `keyspace.table`
    pub fn row_count(&self, keyspace: &str, table: &str) -> usize {
        self.rows
            .read()
            .get(&(keyspace.to_string(), table.to_string()))
            .map_or(0, BTreeMap::len)
    }

    /// Rows of `keyspace.table`, ordered by primary key text
    pub fn rows(&self, keyspace: &str, table: &str) -> Vec<StoredRow> {
        self.rows
            .read()
            .get(&(keyspace.to_string(), table.to_string()))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Fault injection
    // =========================================================================

    /// Make every session call fail with `Unavailable` (or succeed again)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Reject every later DDL statement whose text contains `pattern`
    pub fn reject_ddl_containing(&self, pattern: impl Into<String>) {
        self.rejected_patterns.write().push(pattern.into());
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        self.rejected_patterns.write().clear();
        self.set_available(true);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable(
                "memory store is marked unavailable".to_string(),
            ))
        }
    }

    fn resolve_keyspace(&self, table: &TableRef) -> StoreResult<String> {
        match &table.keyspace {
            Some(ks) => Ok(ks.clone()),
            None => self.keyspace.read().clone().ok_or_else(|| {
                StoreError::Rejected(format!(
                    "no keyspace has been specified for table {}",
                    table.table
                ))
            }),
        }
    }

    fn apply_ddl(&self, statement: Statement) -> StoreResult<()> {
        match statement {
            Statement::CreateKeyspace {
                name,
                if_not_exists,
                replication,
            } => {
                let created =
                    self.catalog
                        .write()
                        .create_keyspace(name.clone(), if_not_exists, replication)?;
                debug!(target: "eventsink::memory", keyspace = %name, created, "CREATE KEYSPACE");
                Ok(())
            }
            Statement::CreateTable {
                table,
                if_not_exists,
                columns,
                primary_key,
            } => {
                let keyspace = self.resolve_keyspace(&table)?;
                let def = TableDef {
                    name: table.table.clone(),
                    columns,
                    primary_key,
                };
                let created = self
                    .catalog
                    .write()
                    .create_table(&keyspace, def, if_not_exists)?;
                debug!(target: "eventsink::memory", keyspace = %keyspace, table = %table.table, created, "CREATE TABLE");
                Ok(())
            }
            Statement::AlterTableAdd { table, column } => {
                let keyspace = self.resolve_keyspace(&table)?;
                debug!(target: "eventsink::memory", keyspace = %keyspace, table = %table.table, column = %column.name, "ALTER TABLE ADD");
                self.catalog
                    .write()
                    .add_column(&keyspace, &table.table, column)
            }
            Statement::Insert { .. } => Err(StoreError::Rejected(
                "INSERT is not a schema statement; prepare it instead".to_string(),
            )),
        }
    }
}

impl Session for MemoryStore {
    fn execute_ddl(&self, cql: &str) -> StoreResult<()> {
        self.ensure_available()?;
        self.ddl_log.write().push(cql.to_string());

        if let Some(pattern) = self
            .rejected_patterns
            .read()
            .iter()
            .find(|p| cql.contains(p.as_str()))
        {
            return Err(StoreError::Rejected(format!(
                "statement matches rejected pattern '{}'",
                pattern
            )));
        }

        let statement = parse(cql)?;
        self.apply_ddl(statement)
    }

    fn use_keyspace(&self, keyspace: &str) -> StoreResult<()> {
        self.ensure_available()?;
        if self.catalog.read().keyspace(keyspace).is_none() {
            return Err(StoreError::UnknownKeyspace(keyspace.to_string()));
        }
        *self.keyspace.write() = Some(keyspace.to_string());
        Ok(())
    }

    fn refresh_schema(&self) -> StoreResult<()> {
        self.ensure_available()?;
        let snapshot = self.catalog.read().clone();
        *self.cached.write() = snapshot;
        Ok(())
    }

    fn list_columns(&self, keyspace: &str, table: &str) -> StoreResult<Vec<Column>> {
        self.ensure_available()?;
        let cached = self.cached.read();
        let def = cached.table(keyspace, table)?;
        Ok(def.columns.clone())
    }

    fn prepare(&self, cql: &str) -> StoreResult<PreparedStatement> {
        self.ensure_available()?;
        let (table, columns) = match parse(cql)? {
            Statement::Insert { table, columns } => (table, columns),
            _ => {
                return Err(StoreError::Rejected(
                    "only INSERT statements can be prepared".to_string(),
                ))
            }
        };
        let keyspace = self.resolve_keyspace(&table)?;

        {
            let catalog = self.catalog.read();
            let def = catalog.table(&keyspace, &table.table)?;
            if let Some(unknown) = columns.iter().find(|c| def.column(c).is_none()) {
                return Err(StoreError::Rejected(format!(
                    "unknown column {} in {}.{}",
                    unknown, keyspace, table.table
                )));
            }
            if !columns.contains(&def.primary_key) {
                return Err(StoreError::Rejected(format!(
                    "missing primary key column {}",
                    def.primary_key
                )));
            }
        }

        let id = self.next_statement.fetch_add(1, Ordering::SeqCst);
        self.prepared.write().insert(
            id,
            PreparedInsert {
                keyspace: keyspace.clone(),
                table: table.table.clone(),
                columns,
            },
        );
        info!(target: "eventsink::memory", statement_id = id, keyspace = %keyspace, table = %table.table, "Prepared insert");
        Ok(PreparedStatement::new(id, cql))
    }

    fn execute_write(&self, statement: &PreparedStatement, row: &ProjectedRow) -> StoreResult<()> {
        self.ensure_available()?;
        let insert = self
            .prepared
            .read()
            .get(&statement.id())
            .cloned()
            .ok_or_else(|| {
                StoreError::Rejected(format!("unknown prepared statement {}", statement.id()))
            })?;

        if let Some(extra) = row.names().find(|n| !insert.columns.iter().any(|c| c == n)) {
            return Err(StoreError::Rejected(format!(
                "value bound for column {} which the statement does not write",
                extra
            )));
        }

        let catalog = self.catalog.read();
        let def = catalog.table(&insert.keyspace, &insert.table)?;

        let mut stored = StoredRow::new();
        for name in &insert.columns {
            let value = row.get(name).ok_or_else(|| {
                StoreError::Rejected(format!("no value bound for column {}", name))
            })?;
            let column = def.column(name).ok_or_else(|| {
                StoreError::Rejected(format!("column {} no longer exists", name))
            })?;
            validate::check(column, value)?;
            stored.insert(name.clone(), value.clone());
        }

        let key = match stored.get(&def.primary_key) {
            None | Some(BoundValue::Null) => {
                return Err(StoreError::Rejected(format!(
                    "primary key {} must not be null",
                    def.primary_key
                )))
            }
            Some(value) => value.to_json().to_string(),
        };
        drop(catalog);

        self.rows
            .write()
            .entry((insert.keyspace, insert.table))
            .or_default()
            .insert(key, stored);
        Ok(())
    }
}
