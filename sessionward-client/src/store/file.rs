//! File-backed storage
//!
//! One `<key>.json` file per entry under a directory, so cached sessions
//! survive process restarts the way browser storage survives reloads.

use async_trait::async_trait;
use sessionward_core::{KeyValueStore, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FileStore {
    storage_dir: PathBuf,
}

impl FileStore {
    /// Create the store, creating `storage_dir` if it doesn't exist
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> Result<Self, StorageError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        info!("Local store initialized at: {}", storage_dir.display());

        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(StorageError::Unavailable(format!(
                "invalid store key '{}'",
                key
            )));
        }

        Ok(self.storage_dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.entry_path(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        // Write-then-rename keeps readers from seeing a half-written entry
        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        debug!("Saved local store entry {} to {}", key, path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.entry_path(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted local store entry: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
