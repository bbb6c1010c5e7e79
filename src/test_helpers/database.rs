//! A throwaway SQLite database standing in for the monitored database.

use std::path::Path;

use sqlx::{
    AnyPool,
    any::{AnyPoolOptions, install_default_drivers},
};

/// An `orders` table in a SQLite file, reachable through the same `Any`
/// driver the executor uses.
pub struct TestDatabase {
    url: String,
    pool: AnyPool,
}

impl TestDatabase {
    /// Creates `monitored.db` inside `dir` with an empty `orders` table.
    pub async fn create(dir: &Path) -> Self {
        install_default_drivers();
        let url = format!("sqlite://{}?mode=rwc", dir.join("monitored.db").display());
        let pool = AnyPoolOptions::new().max_connections(1).connect(&url).await.unwrap();
        sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY, status TEXT NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        Self { url, pool }
    }

    /// The connection URL of the database.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Inserts orders with status `new`.
    pub async fn insert_orders(&self, ids: &[i64]) {
        for id in ids {
            sqlx::query("INSERT INTO orders (id, status) VALUES (?, 'new')")
                .bind(*id)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    /// Closes the helper's own connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
