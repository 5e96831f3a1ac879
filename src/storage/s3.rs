use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use std::sync::OnceLock;

use crate::{
    config::StorageConfig,
    errors::{AppError, Result},
    storage::ObjectStore,
};

/// S3-compatible object store. The client is built on first use and then
/// shared by every request.
pub struct S3Storage {
    config: StorageConfig,
    client: OnceLock<Client>,
}

impl S3Storage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &Client {
        self.client.get_or_init(|| {
            let credentials = Credentials::new(
                self.config.access_key.clone(),
                self.config.secret_key.clone(),
                None,
                None,
                "environment",
            );
            let s3_config = aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .endpoint_url(&self.config.endpoint)
                .region(Region::new(self.config.region.clone()))
                .credentials_provider(credentials)
                .force_path_style(true)
                .build();

            tracing::info!("S3 client configured for {}", self.config.endpoint);
            Client::from_conf(s3_config)
        })
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.client()
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                AppError::Storage(format!("Failed to store {}: {}", key, DisplayErrorContext(&e)))
            })?;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client()
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                AppError::Storage(format!("Failed to fetch {}: {}", key, DisplayErrorContext(&e)))
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", key, e)))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client()
            .head_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().map_or(false, |err| err.is_not_found()) => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to check {}: {}",
                key,
                DisplayErrorContext(&e)
            ))),
        }
    }
}
