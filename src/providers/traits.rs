//! This module defines the interface for running a monitored query.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::RowId;

/// Custom error type for query execution.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The database could not be reached, or the connection was lost.
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// The statement was rejected or failed while running.
    #[error("Query execution failed: {0}")]
    Execution(#[source] sqlx::Error),

    /// A row's leading column could not be read as an integer.
    #[error("Row {row} has no integer identifier in its first column: {source}")]
    NonIntegerIdentifier {
        /// Zero-based index of the offending row.
        row: usize,
        /// The decoding error.
        #[source]
        source: sqlx::Error,
    },
}

impl QueryError {
    /// Sorts a driver error into connection loss or statement failure.
    pub fn from_driver(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => QueryError::Connection(error),
            other => QueryError::Execution(other),
        }
    }
}

/// Runs one SQL statement and returns the row identifiers it produced.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `sql`, reading every row's leading column as an identifier.
    ///
    /// Identifiers are returned in result order.
    async fn run(&self, sql: &str) -> Result<Vec<RowId>, QueryError>;

    /// Releases the underlying connections.
    async fn close(&self) {}
}
