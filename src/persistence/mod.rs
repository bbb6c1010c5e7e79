//! This module contains the state management logic for the sqlal application.

pub mod error;
pub mod file;
pub mod sqlite;
pub mod traits;

use std::sync::Arc;

pub use file::FileIdentifierStore;
pub use sqlite::SqliteIdentifierStore;

use self::{error::PersistenceError, traits::IdentifierStore};
use crate::config::{AppConfig, StateConfig};

/// Opens the identifier store selected by the `state` section of `config`,
/// running migrations for the SQLite backend.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn IdentifierStore>, PersistenceError> {
    if let StateConfig::Sqlite { database_url } = &config.state {
        let store = SqliteIdentifierStore::new(database_url).await?;
        store.run_migrations().await?;
        return Ok(Arc::new(store));
    }

    let directory = config.state.file_directory(&config.config_dir).ok_or_else(|| {
        PersistenceError::InvalidInput("state directory could not be resolved".to_string())
    })?;
    Ok(Arc::new(FileIdentifierStore::new(&directory).await?))
}
