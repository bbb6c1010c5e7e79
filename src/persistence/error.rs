//! This module contains the error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The stored identifiers for a query could not be parsed. The record is
    /// left untouched so that it can be inspected and repaired.
    #[error("Malformed state for query '{name}': {reason}")]
    MalformedState {
        /// The query the record belongs to.
        name: String,
        /// What was wrong with the record.
        reason: String,
    },

    /// Reading the stored identifiers failed.
    #[error("Failed to read state for query '{name}': {source}")]
    Read {
        /// The query the record belongs to.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Persisting the identifiers failed.
    #[error("Failed to write state for query '{name}': {source}")]
    Write {
        /// The query the record belongs to.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A general error occurred during a data store operation.
    #[error("A data store operation failed: {0}")]
    OperationFailed(String),

    /// An error occurred during serialization or deserialization.
    #[error("Failed to serialize or deserialize data: {0}")]
    SerializationError(String),

    /// An error occurred during a database migration.
    #[error("A data migration failed: {0}")]
    MigrationError(String),

    /// An invalid configuration or input was provided.
    #[error("An invalid configuration or input was provided: {0}")]
    InvalidInput(String),
}
