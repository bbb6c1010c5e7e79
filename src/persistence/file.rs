//! An `IdentifierStore` keeping one line-delimited file per query.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::{fs, io::AsyncWriteExt};

use super::{error::PersistenceError, traits::IdentifierStore};
use crate::models::IdentifierSet;

const FILE_SUFFIX: &str = "_processed_ids.txt";

/// Appended to the record file name while a write is in progress.
const TMP_EXTENSION: &str = "txt.tmp";

/// Longest file name most filesystems accept, in bytes.
const MAX_FILE_NAME: usize = 255;

/// Hex characters of the name digest kept in shortened file names.
const DIGEST_LEN: usize = 32;

/// Stores the identifiers of each query in
/// `<directory>/<encoded name>_processed_ids.txt`, one integer per line.
#[derive(Debug, Clone)]
pub struct FileIdentifierStore {
    directory: PathBuf,
}

impl FileIdentifierStore {
    /// Opens the store, creating `directory` if it does not exist.
    #[tracing::instrument(level = "info")]
    pub async fn new(directory: &Path) -> Result<Self, PersistenceError> {
        fs::create_dir_all(directory).await.map_err(|e| {
            PersistenceError::InvalidInput(format!(
                "cannot create state directory {}: {e}",
                directory.display()
            ))
        })?;
        tracing::info!(directory = %directory.display(), "File identifier store ready.");
        Ok(Self { directory: directory.to_path_buf() })
    }

    /// The file backing the record of `name`.
    ///
    /// Names are percent-encoded so that no query name can address a path
    /// outside the store directory. Encoded names too long for a file name
    /// are cut and suffixed with a digest of the full name.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{}{FILE_SUFFIX}", file_stem(name)))
    }
}

/// The file name of `name` without the record suffix.
fn file_stem(name: &str) -> String {
    let encoded = urlencoding::encode(name);
    // Room for the suffix and the temporary extension used while writing.
    let budget = MAX_FILE_NAME - FILE_SUFFIX.len() - TMP_EXTENSION.len() - 1;
    if encoded.len() <= budget {
        return encoded.into_owned();
    }

    let digest = Sha256::digest(name.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    // The encoded form is ASCII, so any byte index is a char boundary.
    let prefix = &encoded[..budget - DIGEST_LEN - 1];
    format!("{prefix}-{}", &hex[..DIGEST_LEN])
}

/// Parses a line-delimited record. Blank lines are ignored.
fn parse_identifiers(name: &str, content: &str) -> Result<IdentifierSet, PersistenceError> {
    let mut ids = IdentifierSet::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let id = line.parse().map_err(|_| PersistenceError::MalformedState {
            name: name.to_string(),
            reason: format!("line {} is not an integer: '{line}'", index + 1),
        })?;
        ids.insert(id);
    }
    Ok(ids)
}

#[async_trait]
impl IdentifierStore for FileIdentifierStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn load(&self, name: &str) -> Result<IdentifierSet, PersistenceError> {
        let path = self.path_for(name);
        match fs::read_to_string(&path).await {
            Ok(content) => {
                let ids = parse_identifiers(name, &content)?;
                tracing::debug!(query = name, count = ids.len(), "Loaded seen identifiers.");
                Ok(ids)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(query = name, "No state file yet, starting empty.");
                Ok(IdentifierSet::new())
            }
            Err(source) => Err(PersistenceError::Read { name: name.to_string(), source }),
        }
    }

    #[tracing::instrument(skip(self, ids), level = "debug")]
    async fn save(&self, name: &str, ids: &IdentifierSet) -> Result<(), PersistenceError> {
        let path = self.path_for(name);
        let tmp_path = path.with_extension(TMP_EXTENSION);
        let content: String = ids.iter().map(|id| format!("{id}\n")).collect();

        let write = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp_path, &path).await
        };

        if let Err(source) = write.await {
            // Best effort; the previous record is still intact.
            let _ = fs::remove_file(&tmp_path).await;
            return Err(PersistenceError::Write { name: name.to_string(), source });
        }

        tracing::debug!(query = name, count = ids.len(), "Seen identifiers saved.");
        Ok(())
    }
}
