//! Table schema types
//!
//! - `ColumnType`: CQL column type, scalar or collection
//! - `Column`: a declared table attribute
//! - `ColumnList`: the authoritative, ordered set of declared columns
//!
//! The column list read back from the store is the single source of truth
//! for which fields of a record belong to the fixed part of a row.

use crate::bucket::BucketKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Primary key column; always receives a freshly generated id.
pub const ID_COLUMN: &str = "id";

/// Column receiving the remapped version field.
pub const VERSION_COLUMN: &str = "version";

/// Column receiving the remapped timestamp field.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// CQL column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// `uuid`
    Uuid,
    /// `timeuuid`
    TimeUuid,
    /// `text` (also `varchar`)
    Text,
    /// `ascii`
    Ascii,
    /// `timestamp`
    Timestamp,
    /// `boolean`
    Boolean,
    /// `int`
    Int,
    /// `bigint`
    BigInt,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `set<T>`
    Set(Box<ColumnType>),
    /// `list<T>`
    List(Box<ColumnType>),
    /// `map<K,V>`
    Map(Box<ColumnType>, Box<ColumnType>),
    /// Any other type the store reports, kept verbatim
    Other(String),
}

impl ColumnType {
    /// Resolve a scalar type name (case-insensitive).
    ///
    /// Unknown names become [`ColumnType::Other`] so that operator-added
    /// columns of exotic types are still honored.
    pub fn scalar(name: &str) -> ColumnType {
        match name.to_ascii_lowercase().as_str() {
            "uuid" => ColumnType::Uuid,
            "timeuuid" => ColumnType::TimeUuid,
            "text" | "varchar" => ColumnType::Text,
            "ascii" => ColumnType::Ascii,
            "timestamp" => ColumnType::Timestamp,
            "boolean" => ColumnType::Boolean,
            "int" => ColumnType::Int,
            "bigint" => ColumnType::BigInt,
            "float" => ColumnType::Float,
            "double" => ColumnType::Double,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// `set<T>`
    pub fn set_of(element: ColumnType) -> ColumnType {
        ColumnType::Set(Box::new(element))
    }

    /// `list<T>`
    pub fn list_of(element: ColumnType) -> ColumnType {
        ColumnType::List(Box::new(element))
    }

    /// `map<K,V>`
    pub fn map_of(key: ColumnType, value: ColumnType) -> ColumnType {
        ColumnType::Map(Box::new(key), Box::new(value))
    }

    /// Whether this is a textual scalar
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::Ascii)
    }

    /// Whether this is an integral scalar
    pub fn is_integral(&self) -> bool {
        matches!(self, ColumnType::Int | ColumnType::BigInt)
    }

    /// Whether this is a floating-point scalar
    pub fn is_floating(&self) -> bool {
        matches!(self, ColumnType::Float | ColumnType::Double)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Uuid => write!(f, "uuid"),
            ColumnType::TimeUuid => write!(f, "timeuuid"),
            ColumnType::Text => write!(f, "text"),
            ColumnType::Ascii => write!(f, "ascii"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::BigInt => write!(f, "bigint"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Double => write!(f, "double"),
            ColumnType::Set(e) => write!(f, "set<{}>", e),
            ColumnType::List(e) => write!(f, "list<{}>", e),
            ColumnType::Map(k, v) => write!(f, "map<{},{}>", k, v),
            ColumnType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A declared table attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Declared type
    pub column_type: ColumnType,
}

impl Column {
    /// Create a column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered list of declared columns with O(1) name lookup
///
/// Immutable once built; share it by reference (or `Arc`) across workers.
#[derive(Debug, Clone, Default)]
pub struct ColumnList {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl ColumnList {
    /// Build from columns in declared order.
    ///
    /// A name that occurs twice keeps its first position.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut deduped = Vec::with_capacity(columns.len());
        let mut index = HashMap::with_capacity(columns.len());
        for column in columns {
            if !index.contains_key(&column.name) {
                index.insert(column.name.clone(), deduped.len());
                deduped.push(column);
            }
        }
        ColumnList {
            columns: deduped,
            index,
        }
    }

    /// Whether `name` is a declared column
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a column by name
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    /// Column names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Iterate over columns in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Number of declared columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no columns are declared
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The columns as a slice
    pub fn as_slice(&self) -> &[Column] {
        &self.columns
    }
}

impl PartialEq for ColumnList {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for ColumnList {}

impl From<Vec<Column>> for ColumnList {
    fn from(columns: Vec<Column>) -> Self {
        ColumnList::new(columns)
    }
}

impl<'a> IntoIterator for &'a ColumnList {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Columns of the baseline table, in DDL order.
pub fn baseline_columns() -> ColumnList {
    let mut columns = vec![
        Column::new(ID_COLUMN, ColumnType::Uuid),
        Column::new(VERSION_COLUMN, ColumnType::Text),
        Column::new(TIMESTAMP_COLUMN, ColumnType::Timestamp),
        Column::new("tags", ColumnType::set_of(ColumnType::Text)),
        Column::new("type", ColumnType::Text),
        Column::new("message", ColumnType::Text),
        Column::new("path", ColumnType::Text),
        Column::new("host", ColumnType::Text),
    ];
    // DDL order of the buckets differs from their classification order
    for kind in [
        BucketKind::Bool,
        BucketKind::Timestamp,
        BucketKind::Float,
        BucketKind::Int,
        BucketKind::Text,
    ] {
        columns.push(Column::new(kind.column_name(), kind.column_type()));
    }
    ColumnList::new(columns)
}
