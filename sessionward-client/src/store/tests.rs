//! Tests for the local store adapter and its backends

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::{json, Value};
    use sessionward_core::Session;

    fn memory_store() -> (Arc<MemoryStore>, LocalStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), LocalStore::new(backend))
    }

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let (backend, store) = memory_store();

        assert!(store.set("session", &json!({ "user": { "name": "Ada" } })).await);
        assert!(store.set("session", &json!({ "user": { "name": "Ada" } })).await);
        assert_eq!(backend.len().await, 1);

        let value: Option<Value> = store.get("session").await;
        assert_eq!(value, Some(json!({ "user": { "name": "Ada" } })));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let (_, store) = memory_store();
        let value: Option<Value> = store.get("session").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_absent() {
        let (backend, store) = memory_store();
        backend.write("session", "{not json").await.unwrap();

        let value: Option<Session> = store.get("session").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_absent() {
        let (backend, store) = memory_store();
        backend.write("session", "[1, 2, 3]").await.unwrap();

        let value: Option<Session> = store.get("session").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_remove_clears_entry() {
        let (backend, store) = memory_store();
        assert!(store.set("session", &json!({ "a": 1 })).await);

        assert!(store.remove("session").await);
        assert!(backend.is_empty().await);

        // Removing again is still a success
        assert!(store.remove("session").await);
    }

    #[tokio::test]
    async fn test_disabled_storage_never_raises() {
        let store = LocalStore::new(Arc::new(DisabledStore));

        let value: Option<Value> = store.get("session").await;
        assert!(value.is_none());
        assert!(!store.set("session", &json!({ "a": 1 })).await);
        assert!(!store.remove("session").await);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let first = LocalStore::new(Arc::new(FileStore::new(dir.path()).unwrap()));
        assert!(first.set("session", &json!({ "user": "ada" })).await);

        let second = LocalStore::new(Arc::new(FileStore::new(dir.path()).unwrap()));
        let value: Option<Value> = second.get("session").await;
        assert_eq!(value, Some(json!({ "user": "ada" })));

        assert!(second.remove("session").await);
        assert!(!dir.path().join("session.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("store");

        let backend = FileStore::new(&nested).unwrap();
        assert_eq!(backend.storage_dir(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(Arc::new(FileStore::new(dir.path()).unwrap()));

        assert!(!store.set("../escape", &json!(1)).await);
        assert!(!store.set("", &json!(1)).await);
        let value: Option<Value> = store.get("../escape").await;
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_entry_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session.json"), "\u{0}garbage").unwrap();

        let store = LocalStore::new(Arc::new(FileStore::new(dir.path()).unwrap()));
        let value: Option<Session> = store.get("session").await;
        assert!(value.is_none());
    }
}
