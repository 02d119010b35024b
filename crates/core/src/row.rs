//! Projected rows ready for a parameterized write

use crate::bucket::Bucket;
use crate::value::Value;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value bound to one column of a prepared write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoundValue {
    /// Explicit absence for this column
    Null,
    /// Generated identifier
    Uuid(Uuid),
    /// Text produced by a reserved-field remap
    Text(String),
    /// Timestamp produced by a reserved-field remap
    Timestamp(DateTime<Utc>),
    /// Overflow bucket contents
    Bucket(Bucket),
    /// Input value passed through unchanged to a same-named column
    Field(Value),
}

impl BoundValue {
    /// Whether this is an explicit null
    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }

    /// Get the bucket if this is a Bucket value
    pub fn as_bucket(&self) -> Option<&Bucket> {
        match self {
            BoundValue::Bucket(b) => Some(b),
            _ => None,
        }
    }

    /// JSON rendering used for diagnostics and CLI output
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as JV;

        fn ts(t: &DateTime<Utc>) -> JV {
            JV::String(t.to_rfc3339_opts(SecondsFormat::Millis, true))
        }

        match self {
            BoundValue::Null => JV::Null,
            BoundValue::Uuid(u) => JV::String(u.to_string()),
            BoundValue::Text(s) => JV::String(s.clone()),
            BoundValue::Timestamp(t) => ts(t),
            BoundValue::Field(v) => v.to_json(),
            BoundValue::Bucket(bucket) => match bucket {
                Bucket::Bool(m) => JV::Object(
                    m.iter().map(|(k, v)| (k.clone(), JV::Bool(*v))).collect(),
                ),
                Bucket::Timestamp(m) => {
                    JV::Object(m.iter().map(|(k, v)| (k.clone(), ts(v))).collect())
                }
                Bucket::Int(m) => JV::Object(
                    m.iter().map(|(k, v)| (k.clone(), JV::from(*v))).collect(),
                ),
                Bucket::Float(m) => JV::Object(
                    m.iter()
                        .map(|(k, v)| (k.clone(), Value::Float(*v).to_json()))
                        .collect(),
                ),
                Bucket::Text(m) => JV::Object(
                    m.iter()
                        .map(|(k, v)| (k.clone(), JV::String(v.clone())))
                        .collect(),
                ),
            },
        }
    }
}

/// A row with exactly one entry per declared column, in declared order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedRow {
    entries: Vec<(String, BoundValue)>,
}

impl ProjectedRow {
    /// Build from `(column, value)` pairs in declared column order
    pub fn from_entries(entries: Vec<(String, BoundValue)>) -> Self {
        ProjectedRow { entries }
    }

    /// Value bound to `column`
    pub fn get(&self, column: &str) -> Option<&BoundValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Whether `column` is present and explicitly null
    pub fn is_null(&self, column: &str) -> bool {
        matches!(self.get(column), Some(BoundValue::Null))
    }

    /// Column names in declared order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over `(column, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of bound columns
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no columns are bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl IntoIterator for ProjectedRow {
    type Item = (String, BoundValue);
    type IntoIter = std::vec::IntoIter<(String, BoundValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
