//! Core types for eventsink
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Tagged union of every runtime type a record field can carry
//! - Record: Incoming semi-structured event
//! - ColumnType / Column / ColumnList: Declared table schema
//! - BucketKind / Bucket: Typed overflow containers for undeclared fields
//! - BoundValue / ProjectedRow: Column-exact rows ready for a prepared write
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bucket;
pub mod error;
pub mod record;
pub mod row;
pub mod schema;
pub mod value;

pub use bucket::{Bucket, BucketKind};
pub use error::{Error, ProjectionError, Result, StoreError, StoreResult};
pub use record::{Record, TIMESTAMP_FIELD, VERSION_FIELD};
pub use row::{BoundValue, ProjectedRow};
pub use schema::{
    baseline_columns, Column, ColumnList, ColumnType, ID_COLUMN, TIMESTAMP_COLUMN, VERSION_COLUMN,
};
pub use value::Value;
