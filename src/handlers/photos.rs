use axum::http::Method;

use crate::{
    errors::{AppError, Result},
    event::{Cors, Event, EventResponse},
    handlers::AppState,
    models::{CreatePhotoRequest, NewPhoto},
    utils::fields::{non_empty, optional_id, parse_id},
};

pub const CORS: Cors = Cors {
    methods: "GET, POST, DELETE, OPTIONS",
    headers: "Content-Type",
};

pub async fn handle(state: &AppState, event: Event) -> EventResponse {
    if event.is_preflight() {
        return EventResponse::preflight(&CORS);
    }

    let result = dispatch(state, &event).await;
    state.finish("photos", result)
}

async fn dispatch(state: &AppState, event: &Event) -> Result<EventResponse> {
    match event.method(Method::GET)? {
        Method::POST => attach_photo(state, event.parse_body()?).await,
        Method::GET => list_photos(state, event).await,
        _ => Err(AppError::MethodNotAllowed),
    }
}

async fn attach_photo(state: &AppState, request: CreatePhotoRequest) -> Result<EventResponse> {
    let project_id = optional_id("project_id", request.project_id.as_ref())?;
    let photo_url = non_empty(&request.photo_url).map(str::to_string);

    let (project_id, photo_url) = match (project_id, photo_url) {
        (Some(project_id), Some(photo_url)) => (project_id, photo_url),
        _ => return Err(AppError::validation("project_id and photo_url required")),
    };

    let photo = state
        .repository
        .create_photo(&NewPhoto::new(project_id, photo_url, request))
        .await?;
    tracing::info!(photo_id = photo.id, project_id, "Attached photo");

    EventResponse::created(&photo)
}

async fn list_photos(state: &AppState, event: &Event) -> Result<EventResponse> {
    let project_id = event
        .query("project_id")
        .map(|raw| parse_id("project_id", raw))
        .transpose()?
        .flatten()
        .ok_or_else(|| AppError::validation("project_id required"))?;

    let photos = state.repository.list_photos(project_id).await?;
    EventResponse::ok(&photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handlers::testing, models::CreateProjectRequest};
    use serde_json::json;

    async fn seed_project(state: &AppState) -> i64 {
        let user = state
            .repository
            .upsert_user("owner@example.com", Some(""))
            .await
            .unwrap();
        state
            .repository
            .create_project(&CreateProjectRequest::default().into_new_project(user.id))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_attach_with_defaults() {
        let (state, _dir) = testing::state();
        let project_id = seed_project(&state).await;

        let response = handle(
            &state,
            Event::new(Method::POST).with_json(&json!({
                "project_id": project_id,
                "photo_url": "https://cdn.example.com/a.jpg"
            })),
        )
        .await;

        assert_eq!(response.status_code, 201);
        let photo = response.body_json().unwrap();
        assert_eq!(photo["project_id"], project_id);
        assert_eq!(photo["photo_name"], "photo.jpg");
        assert_eq!(photo["position"], 0);
    }

    #[tokio::test]
    async fn test_each_attach_gets_a_fresh_id() {
        let (state, _dir) = testing::state();
        let project_id = seed_project(&state).await;

        let mut ids = Vec::new();
        for _ in 0..2 {
            let response = handle(
                &state,
                Event::new(Method::POST).with_json(&json!({
                    "project_id": project_id,
                    "photo_url": "https://cdn.example.com/same.jpg"
                })),
            )
            .await;
            assert_eq!(response.status_code, 201);
            ids.push(response.body_json().unwrap()["id"].as_i64().unwrap());
        }

        assert_ne!(ids[0], ids[1]);
        assert!(!ids.contains(&project_id));
    }

    #[tokio::test]
    async fn test_attach_requires_project_and_url() {
        let (state, _dir) = testing::state();

        let response = handle(
            &state,
            Event::new(Method::POST).with_json(&json!({ "project_id": 1 })),
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_json().unwrap()["error"],
            "project_id and photo_url required"
        );
    }

    #[tokio::test]
    async fn test_list_orders_by_position() {
        let (state, _dir) = testing::state();
        let project_id = seed_project(&state).await;

        for position in [3, 1, 2] {
            let response = handle(
                &state,
                Event::new(Method::POST).with_json(&json!({
                    "project_id": project_id,
                    "photo_url": format!("https://cdn.example.com/{}.jpg", position),
                    "photo_name": format!("{}.jpg", position),
                    "position": position
                })),
            )
            .await;
            assert_eq!(response.status_code, 201);
        }

        let response = handle(
            &state,
            Event::new(Method::GET).with_query("project_id", &project_id.to_string()),
        )
        .await;
        assert_eq!(response.status_code, 200);

        let positions: Vec<i64> = response
            .body_json()
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|photo| photo["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_requires_project_id() {
        let (state, _dir) = testing::state();

        let response = handle(&state, Event::new(Method::GET)).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.body_json().unwrap()["error"], "project_id required");

        let invalid = handle(&state, Event::new(Method::GET).with_query("project_id", "abc")).await;
        assert_eq!(invalid.status_code, 400);
    }

    #[tokio::test]
    async fn test_put_not_allowed() {
        let (state, _dir) = testing::state();

        let response = handle(&state, Event::new(Method::PUT).with_body("{}")).await;
        assert_eq!(response.status_code, 405);
    }
}
