use async_trait::async_trait;
use sessionward_core::{KeyValueStore, StorageError};

/// Backend that refuses every access, like storage in a sandboxed or
/// private-browsing context.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

#[async_trait]
impl KeyValueStore for DisabledStore {
    async fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage is disabled".to_string()))
    }

    async fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is disabled".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage is disabled".to_string()))
    }
}
