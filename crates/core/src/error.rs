//! Error types for eventsink
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! - [`Error`]: top-level error returned by provisioning, projection and writes
//! - [`ProjectionError`]: why a single record could not be projected
//! - [`StoreError`]: failures reported by a store session

use thiserror::Error;

/// Result type alias for eventsink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for store session calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error types for eventsink
#[derive(Debug, Error)]
pub enum Error {
    /// A DDL statement was rejected for a reason other than "already exists".
    /// Fatal at startup.
    #[error("Provisioning failed on `{statement}`: {source}")]
    Provisioning {
        /// Statement that failed
        statement: String,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// The column list could not be read back after provisioning.
    /// Fatal at startup.
    #[error("Cannot read columns of {keyspace}.{table}: {reason}")]
    ColumnRefresh {
        /// Target keyspace
        keyspace: String,
        /// Target table
        table: String,
        /// Why the read failed
        reason: String,
    },

    /// A record could not be projected; only that record is affected
    #[error("Projection failed: {0}")]
    Projection(#[from] ProjectionError),

    /// The write of a projected row failed in the store session
    #[error("Write failed: {0}")]
    Write(#[source] StoreError),

    /// Input is not a field-to-value mapping
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error only affects the record being processed.
    ///
    /// Record-local errors leave the sink usable; every other error means
    /// the sink must not accept records.
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            Error::Projection(_) | Error::Write(_) | Error::InvalidRecord(_)
        )
    }
}

/// Why a record could not be projected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// A reserved field is absent or null
    #[error("Missing reserved field `{field}`")]
    MissingField {
        /// Reserved field name
        field: String,
    },

    /// The reserved timestamp field could not be parsed
    #[error("Invalid timestamp in `{field}` ({value}): {reason}")]
    InvalidTimestamp {
        /// Reserved field name
        field: String,
        /// Offending value, rendered as text
        value: String,
        /// Parser message
        reason: String,
    },

    /// The reserved version field has no text representation
    #[error("Invalid version in `{field}`: cannot convert {found} to text")]
    InvalidVersion {
        /// Reserved field name
        field: String,
        /// Type name of the offending value
        found: String,
    },
}

/// Failures reported by a store session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The keyspace or table being created already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The statement was refused by the store
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Referenced keyspace does not exist
    #[error("Unknown keyspace: {0}")]
    UnknownKeyspace(String),

    /// Referenced table does not exist
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// The statement could not be parsed
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A bound value does not fit its column type
    #[error("Type mismatch for column `{column}`: expected {expected}, got {found}")]
    TypeMismatch {
        /// Column name
        column: String,
        /// Declared CQL type
        expected: String,
        /// What was bound
        found: String,
    },
}
