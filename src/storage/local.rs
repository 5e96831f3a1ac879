use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::{
    errors::{AppError, Result},
    storage::ObjectStore,
};

/// Filesystem-backed object store; keys map to paths under `base_path`.
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        std::fs::create_dir_all(&base_path)
            .map_err(|e| AppError::Storage(format!("Failed to create storage directory: {}", e)))?;

        Ok(Self { base_path })
    }

    fn get_full_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(AppError::Storage(format!("Invalid object key: {}", key)));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalStorage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let full_path = self.get_full_path(key)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {}", e)))?;

        tracing::debug!("Stored {} ({}) at {}", key, content_type, full_path.display());
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.get_full_path(key)?;

        fs::read(&full_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read file: {}", e)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_path = self.get_full_path(key)?;
        Ok(fs::try_exists(&full_path).await.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_storage_operations() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path()).unwrap();

        let test_data = b"Hello, World!".to_vec();
        let test_key = "photos/file.jpg";

        // Test store
        storage
            .put_object(test_key, test_data.clone(), "image/jpeg")
            .await
            .unwrap();

        // Test exists
        assert!(storage.exists(test_key).await.unwrap());
        assert!(!storage.exists("photos/other.jpg").await.unwrap());

        // Test retrieve
        let retrieved_data = storage.get_object(test_key).await.unwrap();
        assert_eq!(retrieved_data, test_data);
    }

    #[tokio::test]
    async fn test_rejects_keys_escaping_base() {
        let temp_dir = tempdir().unwrap();
        let storage = LocalStorage::new(temp_dir.path()).unwrap();

        let result = storage.put_object("../escape.png", vec![1], "image/png").await;
        assert!(result.is_err());
    }
}
