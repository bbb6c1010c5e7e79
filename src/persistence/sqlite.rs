//! An `IdentifierStore` backed by a key-value table in SQLite.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use super::{error::PersistenceError, traits::IdentifierStore};
use crate::models::IdentifierSet;

/// SQL query constants for the seen identifiers table
mod seen_sql {
    /// Select the identifiers recorded for a query
    pub const SELECT_IDENTIFIERS: &str =
        "SELECT identifiers FROM seen_identifiers WHERE query_name = ?";

    /// Insert or replace the identifiers recorded for a query
    pub const UPSERT_IDENTIFIERS: &str = "INSERT OR REPLACE INTO seen_identifiers \
        (query_name, identifiers, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)";
}

/// Keeps each query's identifiers as a JSON array under the query name.
pub struct SqliteIdentifierStore {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteIdentifierStore {
    /// Creates a new instance of SqliteIdentifierStore with the provided
    /// database URL. This will create the database file if it does not
    /// exist.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true);
        // Access is sequential; a single connection also keeps `sqlite::memory:`
        // databases consistent across calls.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                PersistenceError::OperationFailed(format!("Failed to connect to database: {e}"))
            })?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Running database migrations.");
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::MigrationError(e.to_string())
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Gets access to the underlying connection pool for advanced operations.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool gracefully.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn close(&self) {
        tracing::debug!("Closing SQLite connection pool.");
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed successfully.");
    }

    /// Helper to execute database queries with consistent error handling
    async fn execute_query_with_error_handling<F, T, E>(
        &self,
        operation: &str,
        query_fn: F,
    ) -> Result<T, PersistenceError>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        query_fn.await.map_err(|e| {
            tracing::error!(error = %e, operation = %operation, "Database operation failed.");
            PersistenceError::OperationFailed(e.to_string())
        })
    }
}

#[async_trait]
impl IdentifierStore for SqliteIdentifierStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn load(&self, name: &str) -> Result<IdentifierSet, PersistenceError> {
        let row = self
            .execute_query_with_error_handling(
                "load seen identifiers",
                sqlx::query(seen_sql::SELECT_IDENTIFIERS).bind(name).fetch_optional(&self.pool),
            )
            .await?;

        let Some(row) = row else {
            tracing::debug!(query = name, "No state recorded yet, starting empty.");
            return Ok(IdentifierSet::new());
        };

        let raw: String = row.try_get("identifiers").map_err(|e| {
            PersistenceError::MalformedState { name: name.to_string(), reason: e.to_string() }
        })?;
        let ids: IdentifierSet = serde_json::from_str(&raw).map_err(|e| {
            PersistenceError::MalformedState { name: name.to_string(), reason: e.to_string() }
        })?;

        tracing::debug!(query = name, count = ids.len(), "Loaded seen identifiers.");
        Ok(ids)
    }

    #[tracing::instrument(skip(self, ids), level = "debug")]
    async fn save(&self, name: &str, ids: &IdentifierSet) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(ids)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        self.execute_query_with_error_handling(
            "save seen identifiers",
            sqlx::query(seen_sql::UPSERT_IDENTIFIERS).bind(name).bind(raw).execute(&self.pool),
        )
        .await?;

        tracing::debug!(query = name, count = ids.len(), "Seen identifiers saved.");
        Ok(())
    }
}
