use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::utils::fields::present;

pub const DEFAULT_TITLE: &str = "New project";
pub const DEFAULT_DURATION: i32 = 5;
pub const DEFAULT_ANIMATION: &str = "subtle";
pub const DEFAULT_TRANSITION: &str = "fade";
pub const DEFAULT_EMOJI: &str = "🎬";
pub const DEFAULT_STATUS: &str = "draft";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub duration: i32,
    pub animation_type: String,
    pub transition: String,
    pub thumbnail_emoji: String,
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Photo as embedded in a project listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectPhoto {
    pub id: i64,
    pub photo_url: String,
    pub photo_name: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectWithPhotos {
    #[serde(flatten)]
    pub project: Project,
    pub photos: Vec<ProjectPhoto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub user_id: Option<Value>,
    pub title: Option<String>,
    pub duration: Option<i32>,
    pub animation_type: Option<String>,
    pub transition: Option<String>,
    pub thumbnail_emoji: Option<String>,
}

/// Insert values with defaults already applied.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub user_id: i64,
    pub title: String,
    pub duration: i32,
    pub animation_type: String,
    pub transition: String,
    pub thumbnail_emoji: String,
}

impl CreateProjectRequest {
    pub fn into_new_project(self, user_id: i64) -> NewProject {
        NewProject {
            user_id,
            title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            duration: self.duration.unwrap_or(DEFAULT_DURATION),
            animation_type: self
                .animation_type
                .unwrap_or_else(|| DEFAULT_ANIMATION.to_string()),
            transition: self.transition.unwrap_or_else(|| DEFAULT_TRANSITION.to_string()),
            thumbnail_emoji: self
                .thumbnail_emoji
                .unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub id: Option<Value>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub video_url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectChange {
    Title(String),
    Status(Option<String>),
    VideoUrl(Option<String>),
}

impl ProjectChange {
    pub fn column(&self) -> &'static str {
        match self {
            ProjectChange::Title(_) => "title",
            ProjectChange::Status(_) => "status",
            ProjectChange::VideoUrl(_) => "video_url",
        }
    }

    pub fn apply(&self, project: &mut Project) {
        match self {
            ProjectChange::Title(title) => project.title = title.clone(),
            ProjectChange::Status(status) => project.status = status.clone(),
            ProjectChange::VideoUrl(url) => project.video_url = url.clone(),
        }
    }
}

impl UpdateProjectRequest {
    pub fn changes(&self) -> Vec<ProjectChange> {
        let mut changes = Vec::new();
        if let Some(title) = &self.title {
            changes.push(ProjectChange::Title(title.clone()));
        }
        if let Some(status) = &self.status {
            changes.push(ProjectChange::Status(status.clone()));
        }
        if let Some(video_url) = &self.video_url {
            changes.push(ProjectChange::VideoUrl(video_url.clone()));
        }
        changes
    }
}
