//! A `QueryExecutor` backed by an `sqlx` connection pool.
//!
//! The pool uses the `Any` driver: MySQL in production, SQLite for local
//! setups and tests. Monitored queries are only ever read from.

use async_trait::async_trait;
use sqlx::{
    AnyPool, Row,
    any::{AnyPoolOptions, install_default_drivers},
};

use super::traits::{QueryError, QueryExecutor};
use crate::models::RowId;

/// Runs monitored queries over a shared connection pool.
#[derive(Debug, Clone)]
pub struct SqlQueryExecutor {
    pool: AnyPool,
}

impl SqlQueryExecutor {
    /// Connects to the monitored database. Failure here is fatal at startup.
    #[tracing::instrument(skip(url), level = "info")]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, QueryError> {
        install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to connect to the monitored database.");
                QueryError::Connection(e)
            })?;
        tracing::info!("Connection with database established.");
        Ok(Self { pool })
    }

    /// Gets access to the underlying connection pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl QueryExecutor for SqlQueryExecutor {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn run(&self, sql: &str) -> Result<Vec<RowId>, QueryError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await.map_err(QueryError::from_driver)?;

        let ids = rows
            .iter()
            .enumerate()
            .map(|(row, record)| {
                record
                    .try_get::<i64, _>(0)
                    .map_err(|source| QueryError::NonIntegerIdentifier { row, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = ids.len(), "Query returned identifiers.");
        Ok(ids)
    }

    async fn close(&self) {
        tracing::debug!("Closing database connection pool.");
        self.pool.close().await;
    }
}
