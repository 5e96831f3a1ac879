use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use slideshow_backend::{
    config::Config, create_app, database::memory::MemoryRepository, storage::local::LocalStorage,
    AppState,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create storage dir");
    let storage = LocalStorage::new(dir.path()).expect("Failed to create storage");
    let state = AppState::new(
        Config::default(),
        Arc::new(MemoryRepository::new()),
        Arc::new(storage),
    )
    .expect("Failed to build state");

    (create_app(state), dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let (app, _dir) = setup_app();

    let (status, body) = send_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send_json(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn test_options_on_every_handler() {
    let (app, _dir) = setup_app();

    for uri in [
        "/users",
        "/projects",
        "/projects/1",
        "/photos",
        "/upload-photo",
        "/generate-video",
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers().contains_key("access-control-allow-methods"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty(), "{}", uri);
    }
}

#[tokio::test]
async fn test_slideshow_flow() {
    let (app, _dir) = setup_app();

    // Create a user
    let (status, user) = send_json(
        &app,
        "POST",
        "/users",
        Some(json!({ "email": "flow@example.com", "name": "Flow" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["id"].as_i64().unwrap();

    // Create a project
    let (status, project) = send_json(
        &app,
        "POST",
        "/projects",
        Some(json!({ "user_id": user_id, "title": "Holiday" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let project_id = project["id"].as_i64().unwrap();

    // Upload a photo and attach it
    let (status, upload) = send_json(
        &app,
        "POST",
        "/upload-photo",
        Some(json!({ "file": "data:image/png;base64,aGVsbG8=", "fileName": "sea.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upload["size"], 5);
    let photo_url = upload["url"].as_str().unwrap().to_string();
    assert!(photo_url.ends_with(".png"));

    let (status, photo) = send_json(
        &app,
        "POST",
        "/photos",
        Some(json!({ "project_id": project_id, "photo_url": photo_url, "position": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(photo["photo_url"], photo_url.as_str());

    // Generate the preview
    let (status, preview) = send_json(
        &app,
        "POST",
        "/generate-video",
        Some(json!({ "photos": [photo_url], "duration": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["duration"], 4);

    // Store the video link on the project
    let (status, updated) = send_json(
        &app,
        "PUT",
        &format!("/projects/{}", project_id),
        Some(json!({ "status": "completed", "video_url": preview["video_url"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    // List everything back
    let (status, projects) =
        send_json(&app, "GET", &format!("/projects?user_id={}", user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects.as_array().unwrap().len(), 1);
    assert_eq!(projects[0]["video_url"], preview["video_url"]);
    assert_eq!(projects[0]["photos"][0]["photo_url"], photo_url.as_str());

    let (status, photos) =
        send_json(&app, "GET", &format!("/photos?project_id={}", project_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(photos.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_responses_are_json() {
    let (app, _dir) = setup_app();

    let (status, body) = send_json(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "email or id required" }));

    let (status, body) = send_json(&app, "GET", "/users?email=ghost@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, body) = send_json(&app, "DELETE", "/projects/1", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");

    let (status, body) = send_json(&app, "POST", "/upload-photo", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file data provided");

    let (status, body) =
        send_json(&app, "POST", "/generate-video", Some(json!({ "photos": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No photos provided");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _dir) = setup_app();

    send(&app, "GET", "/users", None).await;
    let (status, text) = send(&app, "GET", "/metrics", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("slideshow_requests_total{handler=\"users\",status=\"400\"} 1"));
}

#[tokio::test]
async fn test_non_utf8_body_keeps_json_and_cors_contract() {
    let (app, _dir) = setup_app();

    for method in ["OPTIONS", "POST"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri("/users")
                    .body(Body::from(vec![0xffu8, 0xfe]))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        assert_eq!(response.headers()["access-control-allow-origin"], "*", "{}", method);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        if method == "OPTIONS" {
            assert_eq!(status, StatusCode::OK);
            assert!(bytes.is_empty());
        } else {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(body["error"].is_string());
        }
    }
}
