use axum::http::Method;

use crate::{
    errors::{AppError, Result},
    event::{Cors, Event, EventResponse},
    handlers::AppState,
    models::{CreateProjectRequest, UpdateProjectRequest},
    utils::fields::{optional_id, parse_id, require_id},
};

// DELETE is advertised to browsers but answered with 405.
pub const CORS: Cors = Cors {
    methods: "GET, POST, PUT, DELETE, OPTIONS",
    headers: "Content-Type, X-User-Id",
};

pub async fn handle(state: &AppState, event: Event) -> EventResponse {
    if event.is_preflight() {
        return EventResponse::preflight(&CORS);
    }

    let result = dispatch(state, &event).await;
    state.finish("projects", result)
}

async fn dispatch(state: &AppState, event: &Event) -> Result<EventResponse> {
    match event.method(Method::GET)? {
        Method::GET => list_projects(state, event).await,
        Method::POST => create_project(state, event.parse_body()?).await,
        Method::PUT => update_project(state, event).await,
        _ => Err(AppError::MethodNotAllowed),
    }
}

async fn list_projects(state: &AppState, event: &Event) -> Result<EventResponse> {
    let user_id = event
        .query("user_id")
        .map(|raw| parse_id("user_id", raw))
        .transpose()?
        .flatten()
        .ok_or_else(|| AppError::validation("user_id required"))?;

    let projects = state.repository.list_projects(user_id).await?;
    EventResponse::ok(&projects)
}

async fn create_project(state: &AppState, request: CreateProjectRequest) -> Result<EventResponse> {
    let user_id = require_id("user_id", request.user_id.as_ref())?;

    let project = state
        .repository
        .create_project(&request.into_new_project(user_id))
        .await?;
    tracing::info!(project_id = project.id, user_id, "Created project");

    EventResponse::created(&project)
}

async fn update_project(state: &AppState, event: &Event) -> Result<EventResponse> {
    let request: UpdateProjectRequest = event.parse_body()?;

    let project_id = match event.path_param("id") {
        Some(raw) => parse_id("project_id", raw)?,
        None => None,
    };
    let project_id = match project_id {
        Some(id) => id,
        None => optional_id("project_id", request.id.as_ref())?
            .ok_or_else(|| AppError::validation("project_id required"))?,
    };

    let changes = request.changes();
    if changes.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let project = state
        .repository
        .update_project(project_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    EventResponse::ok(&project)
}
