//! Record projection
//!
//! Turns one semi-structured [`Record`] into a [`ProjectedRow`] holding
//! exactly one entry per declared column:
//!
//! 1. The reserved version and timestamp fields are validated and remapped
//!    to the `version` and `timestamp` columns.
//! 2. A fresh identifier is bound to `id`. Reserved outputs whose column
//!    is not declared fall through to the buckets (`s_id`, `s_version`,
//!    `d_timestamp`).
//! 3. Fields named like a declared column pass through unchanged. Every
//!    other field is folded into a typed overflow bucket by its runtime type.
//! 4. Each declared bucket column receives its bucket, possibly empty.
//! 5. Anything still unassigned is bound to an explicit null.
//!
//! Projection is all-or-nothing: an invalid reserved field fails the whole
//! record before any output is produced.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::mem;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use tracing::debug;

use eventsink_core::{
    BoundValue, Bucket, BucketKind, ColumnList, ProjectedRow, ProjectionError, Record, Value,
    ID_COLUMN, TIMESTAMP_COLUMN, TIMESTAMP_FIELD, VERSION_COLUMN, VERSION_FIELD,
};

use crate::config::SinkConfig;
use crate::id::{IdGenerator, RandomIdGenerator};

/// Timestamp layout accepted when the input carries no UTC offset
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Projects records onto a declared column list
///
/// Holds no per-record state; one projector can serve any number of threads.
#[derive(Clone)]
pub struct RecordProjector {
    version_field: String,
    timestamp_field: String,
    ids: Arc<dyn IdGenerator>,
}

impl RecordProjector {
    /// Projector reading `@version` / `@timestamp` and drawing ids from `ids`
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        RecordProjector {
            version_field: VERSION_FIELD.to_string(),
            timestamp_field: TIMESTAMP_FIELD.to_string(),
            ids,
        }
    }

    /// Projector using the reserved field names from `config`
    pub fn from_config(config: &SinkConfig, ids: Arc<dyn IdGenerator>) -> Self {
        RecordProjector::new(ids).with_reserved_fields(&config.version_field, &config.timestamp_field)
    }

    /// Override the reserved input field names
    pub fn with_reserved_fields(
        mut self,
        version_field: impl Into<String>,
        timestamp_field: impl Into<String>,
    ) -> Self {
        self.version_field = version_field.into();
        self.timestamp_field = timestamp_field.into();
        self
    }

    /// Input field remapped to `version`
    pub fn version_field(&self) -> &str {
        &self.version_field
    }

    /// Input field remapped to `timestamp`
    pub fn timestamp_field(&self) -> &str {
        &self.timestamp_field
    }

    /// Project `record` onto `columns`.
    ///
    /// The returned row lists `columns` in declared order, no more and no
    /// fewer. `id`, `version` and `timestamp` are bound directly when
    /// declared and bucketed like any other field otherwise.
    ///
    /// # Errors
    ///
    /// Returns a [`ProjectionError`] if a reserved field is missing, null or
    /// cannot be converted. Nothing is generated in that case.
    pub fn project(
        &self,
        mut record: Record,
        columns: &ColumnList,
    ) -> Result<ProjectedRow, ProjectionError> {
        let version = self.remap_version(record.remove(&self.version_field))?;
        let timestamp = self.remap_timestamp(record.remove(&self.timestamp_field))?;

        let mut assigned: HashMap<String, BoundValue> = HashMap::with_capacity(columns.len());
        let mut overflow = Overflow::default();

        let id = self.ids.new_id();
        let reserved = [
            (ID_COLUMN, BoundValue::Uuid(id), Value::String(id.to_string())),
            (
                VERSION_COLUMN,
                BoundValue::Text(version.clone()),
                Value::String(version),
            ),
            (
                TIMESTAMP_COLUMN,
                BoundValue::Timestamp(timestamp),
                Value::Timestamp(timestamp),
            ),
        ];
        for (column, bound, value) in reserved {
            // Reserved outputs overwrite same-named input fields
            if record.remove(column).is_some() {
                debug!(target: "eventsink::project", field = column, "Input field overwritten by reserved output");
            }
            if columns.contains(column) {
                assigned.insert(column.to_string(), bound);
            } else {
                overflow.absorb(column, value);
            }
        }

        for (name, value) in record {
            if columns.contains(&name) {
                let bound = if value.is_null() {
                    BoundValue::Null
                } else {
                    BoundValue::Field(value)
                };
                assigned.insert(name, bound);
            } else {
                overflow.absorb(&name, value);
            }
        }

        for kind in BucketKind::ALL {
            let column = kind.column_name();
            let bucket = overflow.take(kind);
            if !columns.contains(column) {
                if !bucket.is_empty() {
                    debug!(
                        target: "eventsink::project",
                        bucket = column,
                        entries = bucket.len(),
                        "Discarded bucket with no declared column"
                    );
                }
            } else if assigned.contains_key(column) {
                if !bucket.is_empty() {
                    debug!(
                        target: "eventsink::project",
                        bucket = column,
                        entries = bucket.len(),
                        "Discarded bucket shadowed by input field"
                    );
                }
            } else {
                assigned.insert(column.to_string(), BoundValue::Bucket(bucket));
            }
        }

        let entries = columns
            .iter()
            .map(|column| {
                let value = assigned.remove(&column.name).unwrap_or(BoundValue::Null);
                (column.name.clone(), value)
            })
            .collect();
        Ok(ProjectedRow::from_entries(entries))
    }

    /// Version policy: text pass-through. Integers and finite floats are
    /// rendered in decimal; every other type is rejected.
    fn remap_version(&self, value: Option<Value>) -> Result<String, ProjectionError> {
        match value {
            None | Some(Value::Null) => Err(ProjectionError::MissingField {
                field: self.version_field.clone(),
            }),
            Some(Value::String(s)) => Ok(s),
            Some(Value::Int(i)) => Ok(i.to_string()),
            Some(Value::Float(f)) if f.is_finite() => Ok(f.to_string()),
            Some(other) => Err(ProjectionError::InvalidVersion {
                field: self.version_field.clone(),
                found: other.type_name().to_string(),
            }),
        }
    }

    fn remap_timestamp(&self, value: Option<Value>) -> Result<DateTime<Utc>, ProjectionError> {
        match value {
            None | Some(Value::Null) => Err(ProjectionError::MissingField {
                field: self.timestamp_field.clone(),
            }),
            Some(Value::Timestamp(t)) => Ok(t.trunc_subsecs(3)),
            Some(Value::String(s)) => parse_timestamp(&s).map_err(|reason| {
                ProjectionError::InvalidTimestamp {
                    field: self.timestamp_field.clone(),
                    value: s,
                    reason,
                }
            }),
            Some(other) => Err(ProjectionError::InvalidTimestamp {
                field: self.timestamp_field.clone(),
                value: other.to_canonical_string(),
                reason: format!("expected an ISO-8601 string, found {}", other.type_name()),
            }),
        }
    }
}

impl Default for RecordProjector {
    fn default() -> Self {
        RecordProjector::new(Arc::new(RandomIdGenerator))
    }
}

impl fmt::Debug for RecordProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordProjector")
            .field("version_field", &self.version_field)
            .field("timestamp_field", &self.timestamp_field)
            .finish_non_exhaustive()
    }
}

/// Parse an ISO-8601 timestamp at millisecond precision.
///
/// Strings without an offset are taken as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    match DateTime::parse_from_rfc3339(text) {
        Ok(t) => Ok(t.with_timezone(&Utc).trunc_subsecs(3)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP_FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive).trunc_subsecs(3))
            .map_err(|_| rfc_err.to_string()),
    }
}

/// Per-record accumulator for the five overflow buckets
#[derive(Debug, Default)]
struct Overflow {
    bools: BTreeMap<String, bool>,
    timestamps: BTreeMap<String, DateTime<Utc>>,
    ints: BTreeMap<String, i64>,
    floats: BTreeMap<String, f64>,
    texts: BTreeMap<String, String>,
}

impl Overflow {
    /// Place an undeclared field by its runtime type. Nulls are dropped.
    fn absorb(&mut self, name: &str, value: Value) {
        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.bools.insert(BucketKind::Bool.key_for(name), b);
            }
            Value::Timestamp(t) => {
                self.timestamps
                    .insert(BucketKind::Timestamp.key_for(name), t.trunc_subsecs(3));
            }
            Value::Int(i) => {
                self.ints.insert(BucketKind::Int.key_for(name), i);
            }
            Value::Float(f) => {
                self.floats.insert(BucketKind::Float.key_for(name), f);
            }
            Value::String(s) => {
                self.texts.insert(BucketKind::Text.key_for(name), s);
            }
            structured @ (Value::Array(_) | Value::Object(_)) => {
                self.texts.insert(
                    BucketKind::Text.key_for(name),
                    structured.to_canonical_string(),
                );
            }
        }
    }

    fn take(&mut self, kind: BucketKind) -> Bucket {
        match kind {
            BucketKind::Bool => Bucket::Bool(mem::take(&mut self.bools)),
            BucketKind::Timestamp => Bucket::Timestamp(mem::take(&mut self.timestamps)),
            BucketKind::Int => Bucket::Int(mem::take(&mut self.ints)),
            BucketKind::Float => Bucket::Float(mem::take(&mut self.floats)),
            BucketKind::Text => Bucket::Text(mem::take(&mut self.texts)),
        }
    }
}
