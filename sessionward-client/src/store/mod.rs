//! Local Store Adapter and storage backends
//!
//! The adapter wraps a `KeyValueStore` and never fails: backend errors,
//! missing keys and malformed JSON all degrade to "absent" or "no-op".

use serde::{de::DeserializeOwned, Serialize};
use sessionward_core::{KeyValueStore, StorageError};
use std::sync::Arc;
use tracing::{debug, warn};

pub mod disabled;
pub mod file;
pub mod memory;

#[cfg(test)]
mod tests;

pub use disabled::DisabledStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Failure-safe JSON view over a key-value backend
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Deserialize the entry stored under `name`, or `None` on any failure
    pub async fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        match self.try_get(name).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = name, error = %e, "Ignoring unreadable local store entry");
                None
            }
        }
    }

    /// Serialize and store `value`; `false` if anything went wrong
    pub async fn set<T: Serialize>(&self, name: &str, value: &T) -> bool {
        match self.try_set(name, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key = name, error = %e, "Local store write failed");
                false
            }
        }
    }

    /// Remove the entry under `name`; `false` if the backend refused
    pub async fn remove(&self, name: &str) -> bool {
        match self.backend.delete(name).await {
            Ok(()) => {
                debug!(key = name, "Removed local store entry");
                true
            }
            Err(e) => {
                warn!(key = name, error = %e, "Local store removal failed");
                false
            }
        }
    }

    async fn try_get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.read(name).await? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn try_set<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.backend.write(name, &raw).await
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}
