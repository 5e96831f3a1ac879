use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;
use crate::models::*;

pub mod memory;
pub mod queries;

use queries::{PhotoQueries, ProjectQueries, UserQueries};

/// Relational store used by the user, project and photo handlers.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn ping(&self) -> Result<()>;

    /// `None` stores a NULL name.
    async fn upsert_user(&self, email: &str, name: Option<&str>) -> Result<User>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: i64, changes: &[UserChange]) -> Result<Option<User>>;

    async fn create_project(&self, project: &NewProject) -> Result<Project>;

    /// Newest first, each with its photos ordered by position.
    async fn list_projects(&self, user_id: i64) -> Result<Vec<ProjectWithPhotos>>;

    /// Returns `None` when no project has this id.
    async fn update_project(&self, id: i64, changes: &[ProjectChange]) -> Result<Option<Project>>;

    async fn create_photo(&self, photo: &NewPhoto) -> Result<Photo>;

    async fn list_photos(&self, project_id: i64) -> Result<Vec<Photo>>;
}

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

#[async_trait]
impl Repository for Database {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_user(&self, email: &str, name: Option<&str>) -> Result<User> {
        UserQueries::upsert(&self.pool, email, name).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserQueries::find_by_email(&self.pool, email).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        UserQueries::find_by_id(&self.pool, id).await
    }

    async fn update_user(&self, id: i64, changes: &[UserChange]) -> Result<Option<User>> {
        UserQueries::update(&self.pool, id, changes).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        ProjectQueries::create(&self.pool, project).await
    }

    async fn list_projects(&self, user_id: i64) -> Result<Vec<ProjectWithPhotos>> {
        ProjectQueries::list_with_photos(&self.pool, user_id).await
    }

    async fn update_project(&self, id: i64, changes: &[ProjectChange]) -> Result<Option<Project>> {
        ProjectQueries::update(&self.pool, id, changes).await
    }

    async fn create_photo(&self, photo: &NewPhoto) -> Result<Photo> {
        PhotoQueries::create(&self.pool, photo).await
    }

    async fn list_photos(&self, project_id: i64) -> Result<Vec<Photo>> {
        PhotoQueries::list_by_project(&self.pool, project_id).await
    }
}

/// Builds the repository named by `DATABASE_URL`. `memory://` keeps
/// everything in process, anything else is a Postgres DSN.
pub async fn connect(config: &Config) -> Result<Arc<dyn Repository>> {
    if config.database_url.starts_with("memory:") {
        tracing::warn!("Using in-memory repository; data will not survive a restart");
        return Ok(Arc::new(memory::MemoryRepository::new()));
    }

    let database = Database::new(&config.database_url).await?;
    if config.run_migrations {
        database.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Arc::new(database))
}
