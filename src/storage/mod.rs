use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::errors::{AppError, Result};

pub mod local;
pub mod s3;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    async fn exists(&self, key: &str) -> Result<bool>;
}

pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    match config.backend {
        StorageBackend::Local => {
            let storage = local::LocalStorage::new(&config.local_path)?;
            Ok(Arc::new(storage))
        }
        StorageBackend::S3 => {
            if config.access_key.is_empty() || config.secret_key.is_empty() {
                return Err(AppError::Config(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY are required for s3 storage"
                        .to_string(),
                ));
            }
            Ok(Arc::new(s3::S3Storage::new(config.clone())))
        }
    }
}
