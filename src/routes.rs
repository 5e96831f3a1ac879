//! HTTP surface: adapts axum requests into handler events.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::Method,
    routing::{any, get},
    Router,
};
use std::collections::HashMap;
use tower_http::trace::TraceLayer;

use crate::{
    event::{Event, EventResponse},
    handlers::{generate_video, health, metrics, photos, projects, upload, users, AppState},
};

type Params = HashMap<String, String>;

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_body_size;

    Router::new()
        .route("/users", any(users_route))
        .route("/projects", any(projects_route))
        .route("/projects/:id", any(project_by_id_route))
        .route("/photos", any(photos_route))
        .route("/upload-photo", any(upload_route))
        .route("/generate-video", any(generate_video_route))
        .route("/health", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/metrics", get(metrics::metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn users_route(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    users::handle(&state, Event::from_http(method, query, Params::new(), body)).await
}

async fn projects_route(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    projects::handle(&state, Event::from_http(method, query, Params::new(), body)).await
}

async fn project_by_id_route(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<Params>,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    projects::handle(&state, Event::from_http(method, query, path, body)).await
}

async fn photos_route(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    photos::handle(&state, Event::from_http(method, query, Params::new(), body)).await
}

async fn upload_route(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    upload::handle(&state, Event::from_http(method, query, Params::new(), body)).await
}

async fn generate_video_route(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<Params>,
    body: Bytes,
) -> EventResponse {
    generate_video::handle(&state, Event::from_http(method, query, Params::new(), body)).await
}
