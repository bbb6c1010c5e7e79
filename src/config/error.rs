//! Error types for loading and validating the configuration document.

use thiserror::Error;

/// Errors that can occur while loading, validating, or writing the
/// configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The document was read but holds values the monitor cannot run with.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Writing the default document failed.
    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the default document failed.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}
