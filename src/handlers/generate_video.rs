use axum::http::Method;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    event::{Cors, Event, EventResponse},
    handlers::AppState,
    models::{PreviewRequest, PreviewResponse},
    services::preview::PreviewRenderer,
};

pub const CORS: Cors = Cors {
    methods: "POST, OPTIONS",
    headers: "Content-Type",
};

pub async fn handle(state: &AppState, event: Event) -> EventResponse {
    if event.is_preflight() {
        return EventResponse::preflight(&CORS);
    }

    let result = dispatch(state, &event).await;
    state.finish("generate-video", result)
}

async fn dispatch(state: &AppState, event: &Event) -> Result<EventResponse> {
    if event.method(Method::POST)? != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    generate_preview(state, event.parse_body()?).await
}

/// Renders and stores the preview frame. The returned `video_url` points at
/// `output.mp4`, which nothing ever writes.
async fn generate_preview(state: &AppState, request: PreviewRequest) -> Result<EventResponse> {
    let photo_count = request.photos.as_ref().map_or(0, Vec::len);
    if photo_count == 0 {
        return Err(AppError::validation("No photos provided"));
    }

    let settings = request.settings();
    let duration = settings
        .total_duration(photo_count)
        .ok_or_else(|| AppError::validation("duration out of range"))?;
    let video_id = Uuid::new_v4().to_string();

    let renderer = PreviewRenderer::new(&state.config.preview);
    let render_settings = settings.clone();
    let preview = tokio::task::spawn_blocking(move || renderer.render(photo_count, &render_settings))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let preview_key = format!("videos/{}/preview.png", video_id);
    let size = preview.len();
    state
        .storage
        .put_object(&preview_key, preview, "image/png")
        .await?;
    state.metrics.record_stored_bytes("preview", size);
    tracing::info!(video_id = %video_id, photo_count, "Generated preview");

    let storage = &state.config.storage;
    EventResponse::ok(&PreviewResponse {
        preview_url: storage.public_url(&preview_key),
        video_url: storage.public_url(&format!("videos/{}/output.mp4", video_id)),
        video_id,
        status: "completed".to_string(),
        duration,
        settings,
    })
}
