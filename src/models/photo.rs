use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::utils::file::DEFAULT_FILE_NAME;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub project_id: i64,
    pub photo_url: String,
    pub photo_name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePhotoRequest {
    pub project_id: Option<Value>,
    pub photo_url: Option<String>,
    pub photo_name: Option<String>,
    pub position: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub project_id: i64,
    pub photo_url: String,
    pub photo_name: String,
    pub position: i32,
}

impl NewPhoto {
    pub fn new(project_id: i64, photo_url: String, request: CreatePhotoRequest) -> Self {
        Self {
            project_id,
            photo_url,
            photo_name: request
                .photo_name
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            position: request.position.unwrap_or(0),
        }
    }
}
