use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_body_size: usize,
    pub run_migrations: bool,
    pub storage: StorageConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub local_path: String,
    pub cdn_base_url: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub font_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            "local" => StorageBackend::Local,
            other => anyhow::bail!("Unsupported storage backend: {}", other),
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/slideshow".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            max_body_size: env::var("MAX_BODY_SIZE")
                .unwrap_or_else(|_| "20971520".to_string()) // 20MB
                .parse()?,
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()?,
            storage: StorageConfig {
                backend,
                endpoint: env::var("STORAGE_ENDPOINT")
                    .unwrap_or_else(|_| "https://bucket.poehali.dev".to_string()),
                region: env::var("STORAGE_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                bucket: env::var("STORAGE_BUCKET")
                    .unwrap_or_else(|_| "files".to_string()),
                local_path: env::var("STORAGE_LOCAL_PATH")
                    .unwrap_or_else(|_| "./storage".to_string()),
                cdn_base_url: env::var("CDN_BASE_URL")
                    .unwrap_or_else(|_| "https://cdn.poehali.dev".to_string()),
                access_key: env::var("AWS_ACCESS_KEY_ID").unwrap_or_default(),
                secret_key: env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default(),
            },
            preview: PreviewConfig {
                font_path: env::var("PREVIEW_FONT_PATH").unwrap_or_else(|_| {
                    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
                }),
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "memory://".to_string(),
            port: 3000,
            max_body_size: 20 * 1024 * 1024,
            run_migrations: false,
            storage: StorageConfig {
                backend: StorageBackend::Local,
                endpoint: "https://bucket.poehali.dev".to_string(),
                region: "us-east-1".to_string(),
                bucket: "files".to_string(),
                local_path: "./storage".to_string(),
                cdn_base_url: "https://cdn.poehali.dev".to_string(),
                access_key: "test-access-key".to_string(),
                secret_key: "test-secret-key".to_string(),
            },
            preview: PreviewConfig {
                font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            },
        }
    }
}

impl StorageConfig {
    /// Public CDN address of an object. The access key doubles as the
    /// project segment of the path.
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/projects/{}/bucket/{}",
            self.cdn_base_url.trim_end_matches('/'),
            self.access_key,
            key
        )
    }
}
