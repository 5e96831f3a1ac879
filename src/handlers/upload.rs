use axum::http::Method;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    event::{Cors, Event, EventResponse},
    handlers::AppState,
    models::{UploadRequest, UploadResponse},
    utils::{
        fields::non_empty,
        file::{self, DEFAULT_FILE_NAME},
    },
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
    state.finish("upload-photo", result)
}

async fn dispatch(state: &AppState, event: &Event) -> Result<EventResponse> {
    if event.method(Method::POST)? != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    upload_photo(state, event.parse_body()?).await
}

async fn upload_photo(state: &AppState, request: UploadRequest) -> Result<EventResponse> {
    let file_data =
        non_empty(&request.file).ok_or_else(|| AppError::validation("No file data provided"))?;
    let file_name = request
        .file_name
        .clone()
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    let file_bytes = file::decode_file_data(file_data)?;

    let extension = file::get_file_extension(&file_name);
    let content_type = file::get_content_type(extension);
    let key = file::generate_photo_key(Uuid::new_v4(), extension);
    let size = file_bytes.len();

    state
        .storage
        .put_object(&key, file_bytes, content_type)
        .await?;
    state.metrics.record_stored_bytes("photo", size);
    tracing::info!(key = %key, size, content_type, "Uploaded photo");

    EventResponse::ok(&UploadResponse {
        url: state.config.storage.public_url(&key),
        key,
        size,
        file_name,
    })
}
