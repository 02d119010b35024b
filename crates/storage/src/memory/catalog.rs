//! Schema catalog of the in-memory store

use std::collections::BTreeMap;

use eventsink_core::{Column, StoreError, StoreResult};

/// A table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Columns in declared order; `ALTER TABLE ADD` appends
    pub columns: Vec<Column>,
    /// Primary key column
    pub primary_key: String,
}

impl TableDef {
    /// Look up a column
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A keyspace definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceDef {
    /// Keyspace name
    pub name: String,
    /// Replication options as given at creation
    pub replication: BTreeMap<String, String>,
    tables: BTreeMap<String, TableDef>,
}

/// Keyspaces and their tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Catalog {
    keyspaces: BTreeMap<String, KeyspaceDef>,
}

impl Catalog {
    pub(crate) fn keyspace(&self, name: &str) -> Option<&KeyspaceDef> {
        self.keyspaces.get(name)
    }

    pub(crate) fn table(&self, keyspace: &str, table: &str) -> StoreResult<&TableDef> {
        let ks = self
            .keyspaces
            .get(keyspace)
            .ok_or_else(|| StoreError::UnknownKeyspace(keyspace.to_string()))?;
        ks.tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(format!("{}.{}", keyspace, table)))
    }

    pub(crate) fn create_keyspace(
        &mut self,
        name: String,
        if_not_exists: bool,
        replication: BTreeMap<String, String>,
    ) -> StoreResult<bool> {
        if self.keyspaces.contains_key(&name) {
            return if if_not_exists {
                Ok(false)
            } else {
                Err(StoreError::AlreadyExists(format!("keyspace {}", name)))
            };
        }
        self.keyspaces.insert(
            name.clone(),
            KeyspaceDef {
                name,
                replication,
                tables: BTreeMap::new(),
            },
        );
        Ok(true)
    }

    pub(crate) fn create_table(
        &mut self,
        keyspace: &str,
        table: TableDef,
        if_not_exists: bool,
    ) -> StoreResult<bool> {
        let ks = self
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| StoreError::UnknownKeyspace(keyspace.to_string()))?;
        if ks.tables.contains_key(&table.name) {
            return if if_not_exists {
                Ok(false)
            } else {
                Err(StoreError::AlreadyExists(format!(
                    "table {}.{}",
                    keyspace, table.name
                )))
            };
        }
        ks.tables.insert(table.name.clone(), table);
        Ok(true)
    }

    pub(crate) fn add_column(
        &mut self,
        keyspace: &str,
        table: &str,
        column: Column,
    ) -> StoreResult<()> {
        let ks = self
            .keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| StoreError::UnknownKeyspace(keyspace.to_string()))?;
        let def = ks
            .tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(format!("{}.{}", keyspace, table)))?;
        if def.column(&column.name).is_some() {
            return Err(StoreError::Rejected(format!(
                "column {} already exists in {}.{}",
                column.name, keyspace, table
            )));
        }
        def.columns.push(column);
        Ok(())
    }
}
