use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};

use crate::errors::{AppError, Result};
use crate::models::*;

const USER_COLUMNS: &str =
    "id, email, name, subscription_plan, subscription_expires_at, created_at";
const PROJECT_COLUMNS: &str = "id, user_id, title, duration, animation_type, transition, \
     thumbnail_emoji, status, video_url, created_at, updated_at";
const PHOTO_COLUMNS: &str = "id, project_id, photo_url, photo_name, position, created_at";

pub struct UserQueries;

impl UserQueries {
    /// Inserts a demo-plan user, or on an existing email replaces only the name.
    pub async fn upsert(pool: &PgPool, email: &str, name: Option<&str>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, name, subscription_plan)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(name)
        .bind(DEFAULT_PLAN)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update(pool: &PgPool, id: i64, changes: &[UserChange]) -> Result<Option<User>> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut assignments = builder.separated(", ");
            for change in changes {
                assignments.push(change.column());
                assignments.push_unseparated(" = ");
                match change {
                    UserChange::Name(name) => assignments.push_bind_unseparated(name.clone()),
                    UserChange::SubscriptionPlan(plan) => {
                        assignments.push_bind_unseparated(plan.clone())
                    }
                    UserChange::SubscriptionExpiresAt(at) => assignments.push_bind_unseparated(*at),
                };
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {USER_COLUMNS}"));

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }
}

#[derive(FromRow)]
struct ProjectListingRow {
    #[sqlx(flatten)]
    project: Project,
    photos: Json<Vec<ProjectPhoto>>,
}

pub struct ProjectQueries;

impl ProjectQueries {
    pub async fn create(pool: &PgPool, project: &NewProject) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (user_id, title, duration, animation_type, transition, thumbnail_emoji)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(project.user_id)
        .bind(&project.title)
        .bind(project.duration)
        .bind(&project.animation_type)
        .bind(&project.transition)
        .bind(&project.thumbnail_emoji)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    pub async fn list_with_photos(pool: &PgPool, user_id: i64) -> Result<Vec<ProjectWithPhotos>> {
        let rows = sqlx::query_as::<_, ProjectListingRow>(
            r#"
            SELECT p.id, p.user_id, p.title, p.duration, p.animation_type, p.transition,
                   p.thumbnail_emoji, p.status, p.video_url, p.created_at, p.updated_at,
                   COALESCE(
                       json_agg(
                           json_build_object(
                               'id', pp.id,
                               'photo_url', pp.photo_url,
                               'photo_name', pp.photo_name,
                               'position', pp.position
                           ) ORDER BY pp.position, pp.id
                       ) FILTER (WHERE pp.id IS NOT NULL),
                       '[]'::json
                   ) AS photos
            FROM projects p
            LEFT JOIN project_photos pp ON p.id = pp.project_id
            WHERE p.user_id = $1
            GROUP BY p.id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectWithPhotos {
                project: row.project,
                photos: row.photos.0,
            })
            .collect())
    }

    /// Applies the changes and stamps `updated_at`.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        changes: &[ProjectChange],
    ) -> Result<Option<Project>> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE projects SET ");
        {
            let mut assignments = builder.separated(", ");
            for change in changes {
                assignments.push(change.column());
                assignments.push_unseparated(" = ");
                match change {
                    ProjectChange::Title(title) => assignments.push_bind_unseparated(title.clone()),
                    ProjectChange::Status(status) => {
                        assignments.push_bind_unseparated(status.clone())
                    }
                    ProjectChange::VideoUrl(url) => assignments.push_bind_unseparated(url.clone()),
                };
            }
            assignments.push("updated_at = NOW()");
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(format!(" RETURNING {PROJECT_COLUMNS}"));

        let project = builder
            .build_query_as::<Project>()
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }
}

pub struct PhotoQueries;

impl PhotoQueries {
    pub async fn create(pool: &PgPool, photo: &NewPhoto) -> Result<Photo> {
        let photo = sqlx::query_as::<_, Photo>(&format!(
            r#"
            INSERT INTO project_photos (project_id, photo_url, photo_name, position)
            VALUES ($1, $2, $3, $4)
            RETURNING {PHOTO_COLUMNS}
            "#
        ))
        .bind(photo.project_id)
        .bind(&photo.photo_url)
        .bind(&photo.photo_name)
        .bind(photo.position)
        .fetch_one(pool)
        .await?;

        Ok(photo)
    }

    pub async fn list_by_project(pool: &PgPool, project_id: i64) -> Result<Vec<Photo>> {
        let photos = sqlx::query_as::<_, Photo>(&format!(
            "SELECT {PHOTO_COLUMNS} FROM project_photos WHERE project_id = $1 ORDER BY position, id"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(photos)
    }
}
