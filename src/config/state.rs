use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where the already-notified identifiers of every query are kept.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StateConfig {
    /// One line-delimited file per query name.
    File {
        /// Directory holding the state files. Defaults to `processed/` next to
        /// the configuration file.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<PathBuf>,
    },
    /// A key-value table inside an SQLite database.
    Sqlite {
        /// SQLite connection URL, e.g. `sqlite://state.db`.
        database_url: String,
    },
}

impl Default for StateConfig {
    fn default() -> Self {
        StateConfig::File { directory: None }
    }
}

impl StateConfig {
    /// Directory used by the file backend, resolved against `config_dir`.
    pub fn file_directory(&self, config_dir: &Path) -> Option<PathBuf> {
        match self {
            StateConfig::File { directory: Some(dir) } if dir.is_absolute() => Some(dir.clone()),
            StateConfig::File { directory: Some(dir) } => Some(config_dir.join(dir)),
            StateConfig::File { directory: None } => Some(config_dir.join("processed")),
            StateConfig::Sqlite { .. } => None,
        }
    }
}
