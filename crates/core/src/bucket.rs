//! Typed overflow buckets
//!
//! Fields that do not match a declared column are folded into one of five
//! typed map columns. The bucket column is named after its key prefix and
//! every key inside it is `{prefix}{field_name}`:
//!
//! | Kind        | Column / prefix | CQL type                |
//! |-------------|-----------------|-------------------------|
//! | `Bool`      | `b_`            | `map<text,boolean>`     |
//! | `Timestamp` | `d_`            | `map<text,timestamp>`   |
//! | `Int`       | `i_`            | `map<text,bigint>`      |
//! | `Float`     | `f_`            | `map<text,float>`       |
//! | `Text`      | `s_`            | `map<text,text>`        |

use crate::schema::ColumnType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The five overflow bucket kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BucketKind {
    /// Boolean values
    Bool,
    /// Timestamp values
    Timestamp,
    /// Integer values
    Int,
    /// Floating-point values
    Float,
    /// Strings and serialized structures
    Text,
}

impl BucketKind {
    /// All kinds, in classification order
    pub const ALL: [BucketKind; 5] = [
        BucketKind::Bool,
        BucketKind::Timestamp,
        BucketKind::Int,
        BucketKind::Float,
        BucketKind::Text,
    ];

    /// Key prefix, which is also the bucket's column name
    pub fn prefix(&self) -> &'static str {
        match self {
            BucketKind::Bool => "b_",
            BucketKind::Timestamp => "d_",
            BucketKind::Int => "i_",
            BucketKind::Float => "f_",
            BucketKind::Text => "s_",
        }
    }

    /// Name of the column holding this bucket
    pub fn column_name(&self) -> &'static str {
        self.prefix()
    }

    /// CQL type of the bucket column
    pub fn column_type(&self) -> ColumnType {
        let value = match self {
            BucketKind::Bool => ColumnType::Boolean,
            BucketKind::Timestamp => ColumnType::Timestamp,
            BucketKind::Int => ColumnType::BigInt,
            BucketKind::Float => ColumnType::Float,
            BucketKind::Text => ColumnType::Text,
        };
        ColumnType::map_of(ColumnType::Text, value)
    }

    /// Bucket key for an original field name
    pub fn key_for(&self, field: &str) -> String {
        let prefix = self.prefix();
        let mut key = String::with_capacity(prefix.len() + field.len());
        key.push_str(prefix);
        key.push_str(field);
        key
    }

    /// Resolve a bucket column name back to its kind
    pub fn from_column_name(name: &str) -> Option<BucketKind> {
        BucketKind::ALL.into_iter().find(|k| k.column_name() == name)
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Accumulated contents of one overflow bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bucket {
    /// `b_` entries
    Bool(BTreeMap<String, bool>),
    /// `d_` entries
    Timestamp(BTreeMap<String, DateTime<Utc>>),
    /// `i_` entries
    Int(BTreeMap<String, i64>),
    /// `f_` entries
    Float(BTreeMap<String, f64>),
    /// `s_` entries
    Text(BTreeMap<String, String>),
}

impl Bucket {
    /// An empty bucket of the given kind
    pub fn empty(kind: BucketKind) -> Bucket {
        match kind {
            BucketKind::Bool => Bucket::Bool(BTreeMap::new()),
            BucketKind::Timestamp => Bucket::Timestamp(BTreeMap::new()),
            BucketKind::Int => Bucket::Int(BTreeMap::new()),
            BucketKind::Float => Bucket::Float(BTreeMap::new()),
            BucketKind::Text => Bucket::Text(BTreeMap::new()),
        }
    }

    /// Kind of this bucket
    pub fn kind(&self) -> BucketKind {
        match self {
            Bucket::Bool(_) => BucketKind::Bool,
            Bucket::Timestamp(_) => BucketKind::Timestamp,
            Bucket::Int(_) => BucketKind::Int,
            Bucket::Float(_) => BucketKind::Float,
            Bucket::Text(_) => BucketKind::Text,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Bucket::Bool(m) => m.len(),
            Bucket::Timestamp(m) => m.len(),
            Bucket::Int(m) => m.len(),
            Bucket::Float(m) => m.len(),
            Bucket::Text(m) => m.len(),
        }
    }

    /// Whether the bucket has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bucket holds `key`
    pub fn contains_key(&self, key: &str) -> bool {
        match self {
            Bucket::Bool(m) => m.contains_key(key),
            Bucket::Timestamp(m) => m.contains_key(key),
            Bucket::Int(m) => m.contains_key(key),
            Bucket::Float(m) => m.contains_key(key),
            Bucket::Text(m) => m.contains_key(key),
        }
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Bucket::Bool(m) => m.keys().map(String::as_str).collect(),
            Bucket::Timestamp(m) => m.keys().map(String::as_str).collect(),
            Bucket::Int(m) => m.keys().map(String::as_str).collect(),
            Bucket::Float(m) => m.keys().map(String::as_str).collect(),
            Bucket::Text(m) => m.keys().map(String::as_str).collect(),
        }
    }
}
