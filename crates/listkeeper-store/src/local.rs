use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::{validate_key, ObjectStore, StoreConfig, StoreError};

pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            base_dir: config.upload_dir(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StoreError> {
        let path = self.resolve(key)?;
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::Internal(format!("mkdir: {e}")))?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", path.display())))?;
        debug!(key, bytes = data.len(), "stored object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(StoreError::Internal(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.resolve(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::Internal(format!("exists {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &std::path::Path) -> LocalStore {
        LocalStore::new(&StoreConfig {
            upload_dir: Some(dir.to_string_lossy().to_string()),
        })
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store
            .put("report.pdf", Bytes::from("%PDF-1.4"))
            .await
            .unwrap();
        let data = store.get("report.pdf").await.unwrap();
        assert_eq!(data.as_ref(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn put_creates_missing_upload_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(&tmp.path().join("nested").join("uploads"));

        store.put("notes.txt", Bytes::from("hello")).await.unwrap();
        assert!(store.base_dir().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn get_missing_returns_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        let err = store.get("missing.txt").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn put_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        store.put("a.txt", Bytes::from("first")).await.unwrap();
        store.put("a.txt", Bytes::from("second")).await.unwrap();

        let data = store.get("a.txt").await.unwrap();
        assert_eq!(data.as_ref(), b"second");
    }

    #[tokio::test]
    async fn exists_returns_correct_values() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        assert!(!store.exists("a.txt").await.unwrap());
        store.put("a.txt", Bytes::from("data")).await.unwrap();
        assert!(store.exists("a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = test_store(tmp.path());

        let err = store
            .put("../escape.txt", Bytes::from("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }
}
