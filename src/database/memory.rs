//! In-process repository with the same observable behavior as the Postgres
//! one: generated ids, email uniqueness, foreign keys and result ordering.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::{
    database::Repository,
    errors::{AppError, Result},
    models::*,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    photos: Vec<Photo>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory repository lock poisoned")))
    }
}

fn foreign_key_violation(table: &str, constraint: &str) -> AppError {
    AppError::Internal(anyhow::anyhow!(
        "insert or update on table \"{}\" violates foreign key constraint \"{}\"",
        table,
        constraint
    ))
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<()> {
        self.tables().map(|_| ())
    }

    async fn upsert_user(&self, email: &str, name: Option<&str>) -> Result<User> {
        let mut tables = self.tables()?;

        if let Some(existing) = tables.users.iter_mut().find(|user| user.email == email) {
            existing.name = name.map(str::to_string);
            return Ok(existing.clone());
        }

        let user = User {
            id: tables.next_id(),
            email: email.to_string(),
            name: name.map(str::to_string),
            subscription_plan: DEFAULT_PLAN.to_string(),
            subscription_expires_at: None,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|user| user.id == id).cloned())
    }

    async fn update_user(&self, id: i64, changes: &[UserChange]) -> Result<Option<User>> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let mut tables = self.tables()?;
        Ok(tables.users.iter_mut().find(|user| user.id == id).map(|user| {
            for change in changes {
                change.apply(user);
            }
            user.clone()
        }))
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let mut tables = self.tables()?;

        if !tables.users.iter().any(|user| user.id == project.user_id) {
            return Err(foreign_key_violation("projects", "projects_user_id_fkey"));
        }

        let now = Utc::now();
        let project = Project {
            id: tables.next_id(),
            user_id: project.user_id,
            title: project.title.clone(),
            duration: project.duration,
            animation_type: project.animation_type.clone(),
            transition: project.transition.clone(),
            thumbnail_emoji: project.thumbnail_emoji.clone(),
            status: Some(DEFAULT_STATUS.to_string()),
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn list_projects(&self, user_id: i64) -> Result<Vec<ProjectWithPhotos>> {
        let tables = self.tables()?;

        let mut projects: Vec<ProjectWithPhotos> = tables
            .projects
            .iter()
            .filter(|project| project.user_id == user_id)
            .map(|project| {
                let mut photos: Vec<&Photo> = tables
                    .photos
                    .iter()
                    .filter(|photo| photo.project_id == project.id)
                    .collect();
                photos.sort_by_key(|photo| (photo.position, photo.id));

                ProjectWithPhotos {
                    project: project.clone(),
                    photos: photos
                        .into_iter()
                        .map(|photo| ProjectPhoto {
                            id: photo.id,
                            photo_url: photo.photo_url.clone(),
                            photo_name: photo.photo_name.clone(),
                            position: photo.position,
                        })
                        .collect(),
                }
            })
            .collect();

        projects.sort_by(|a, b| {
            b.project
                .created_at
                .cmp(&a.project.created_at)
                .then(b.project.id.cmp(&a.project.id))
        });
        Ok(projects)
    }

    async fn update_project(&self, id: i64, changes: &[ProjectChange]) -> Result<Option<Project>> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let mut tables = self.tables()?;
        Ok(tables
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .map(|project| {
                for change in changes {
                    change.apply(project);
                }
                project.updated_at = Utc::now();
                project.clone()
            }))
    }

    async fn create_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        let mut tables = self.tables()?;

        if !tables.projects.iter().any(|project| project.id == photo.project_id) {
            return Err(foreign_key_violation(
                "project_photos",
                "project_photos_project_id_fkey",
            ));
        }

        let photo = Photo {
            id: tables.next_id(),
            project_id: photo.project_id,
            photo_url: photo.photo_url.clone(),
            photo_name: photo.photo_name.clone(),
            position: photo.position,
            created_at: Utc::now(),
        };
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn list_photos(&self, project_id: i64) -> Result<Vec<Photo>> {
        let tables = self.tables()?;

        let mut photos: Vec<Photo> = tables
            .photos
            .iter()
            .filter(|photo| photo.project_id == project_id)
            .cloned()
            .collect();
        photos.sort_by_key(|photo| (photo.position, photo.id));
        Ok(photos)
    }
}
