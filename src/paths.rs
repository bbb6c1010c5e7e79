//! Filesystem locations used by sqlal.
//!
//! The configuration directory resolves to `dirs::config_dir()/sqlal/`
//! (`~/.config/sqlal/` on Linux). Set `SQLAL_CONFIG_DIR` to override it.

use std::path::PathBuf;

/// File name of the configuration document inside [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application config directory.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("SQLAL_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir().map(|d| d.join("sqlal")).unwrap_or_else(|| PathBuf::from(".sqlal"))
}

/// Default location of the configuration document.
#[must_use]
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}
