use axum::http::Method;

use crate::{
    errors::{AppError, Result},
    event::{Cors, Event, EventResponse},
    handlers::AppState,
    models::{CreateUserRequest, UpdateUserRequest},
    utils::fields::{non_empty, parse_id, require_id},
};

pub const CORS: Cors = Cors {
    methods: "GET, POST, PUT, OPTIONS",
    headers: "Content-Type",
};

pub async fn handle(state: &AppState, event: Event) -> EventResponse {
    if event.is_preflight() {
        return EventResponse::preflight(&CORS);
    }

    let result = dispatch(state, &event).await;
    state.finish("users", result)
}

async fn dispatch(state: &AppState, event: &Event) -> Result<EventResponse> {
    match event.method(Method::GET)? {
        Method::POST => upsert_user(state, event.parse_body()?).await,
        Method::GET => get_user(state, event).await,
        Method::PUT => update_user(state, event.parse_body()?).await,
        _ => Err(AppError::MethodNotAllowed),
    }
}

async fn upsert_user(state: &AppState, request: CreateUserRequest) -> Result<EventResponse> {
    let email = non_empty(&request.email).ok_or_else(|| AppError::validation("email required"))?;
    let user = state.repository.upsert_user(email, request.name()).await?;
    tracing::info!(user_id = user.id, "Upserted user");

    EventResponse::created(&user)
}

async fn get_user(state: &AppState, event: &Event) -> Result<EventResponse> {
    let user = if let Some(email) = event.query("email") {
        state.repository.find_user_by_email(email).await?
    } else if let Some(id) = event.query("id") {
        match parse_id("id", id)? {
            Some(id) => state.repository.find_user_by_id(id).await?,
            None => return Err(AppError::validation("email or id required")),
        }
    } else {
        return Err(AppError::validation("email or id required"));
    };

    let user = user.ok_or_else(|| AppError::not_found("User not found"))?;
    EventResponse::ok(&user)
}

async fn update_user(state: &AppState, request: UpdateUserRequest) -> Result<EventResponse> {
    let id = require_id("user_id", request.id.as_ref())?;

    let changes = request.changes();
    if changes.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let user = state
        .repository
        .update_user(id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    EventResponse::ok(&user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use serde_json::json;

    async fn create(state: &AppState, body: serde_json::Value) -> EventResponse {
        handle(state, Event::new(Method::POST).with_json(&body)).await
    }

    #[tokio::test]
    async fn test_create_user_defaults_to_demo_plan() {
        let (state, _dir) = testing::state();

        let response = create(&state, json!({ "email": "ada@example.com" })).await;
        assert_eq!(response.status_code, 201);

        let user = response.body_json().unwrap();
        assert_eq!(user["email"], "ada@example.com");
        assert_eq!(user["name"], "");
        assert_eq!(user["subscription_plan"], "demo");
        assert!(user["subscription_expires_at"].is_null());
    }

    #[tokio::test]
    async fn test_upsert_same_email_updates_name_only() {
        let (state, _dir) = testing::state();

        let first = create(&state, json!({ "email": "ada@example.com", "name": "Ada" }))
            .await
            .body_json()
            .unwrap();
        let update = Event::new(Method::PUT)
            .with_json(&json!({ "id": first["id"], "subscription_plan": "pro" }));
        assert_eq!(handle(&state, update).await.status_code, 200);

        let second = create(&state, json!({ "email": "ada@example.com", "name": "Ada L." }))
            .await
            .body_json()
            .unwrap();

        assert_eq!(second["id"], first["id"]);
        assert_eq!(second["name"], "Ada L.");
        assert_eq!(second["subscription_plan"], "pro");
    }

    #[tokio::test]
    async fn test_create_with_null_name_stores_null() {
        let (state, _dir) = testing::state();

        let response = create(&state, json!({ "email": "nil@example.com", "name": null })).await;
        assert_eq!(response.status_code, 201);
        assert!(response.body_json().unwrap()["name"].is_null());
    }

    #[tokio::test]
    async fn test_create_requires_email() {
        let (state, _dir) = testing::state();

        let response = create(&state, json!({ "name": "Nobody" })).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(response.body_json().unwrap(), json!({ "error": "email required" }));
    }

    #[tokio::test]
    async fn test_get_by_email_or_id() {
        let (state, _dir) = testing::state();
        let created = create(&state, json!({ "email": "bo@example.com" }))
            .await
            .body_json()
            .unwrap();
        let id = created["id"].as_i64().unwrap().to_string();

        let by_email = handle(&state, Event::new(Method::GET).with_query("email", "bo@example.com")).await;
        assert_eq!(by_email.status_code, 200);
        assert_eq!(by_email.body_json().unwrap()["id"], created["id"]);

        let by_id = handle(&state, Event::new(Method::GET).with_query("id", &id)).await;
        assert_eq!(by_id.status_code, 200);
        assert_eq!(by_id.body_json().unwrap()["email"], "bo@example.com");
    }

    #[tokio::test]
    async fn test_get_errors() {
        let (state, _dir) = testing::state();

        let missing_params = handle(&state, Event::new(Method::GET)).await;
        assert_eq!(missing_params.status_code, 400);
        assert_eq!(
            missing_params.body_json().unwrap()["error"],
            "email or id required"
        );

        let unknown = handle(&state, Event::new(Method::GET).with_query("email", "x@example.com")).await;
        assert_eq!(unknown.status_code, 404);
        assert_eq!(unknown.body_json().unwrap()["error"], "User not found");
    }

    #[tokio::test]
    async fn test_update_validation() {
        let (state, _dir) = testing::state();

        let no_id = handle(&state, Event::new(Method::PUT).with_json(&json!({ "name": "x" }))).await;
        assert_eq!(no_id.status_code, 400);
        assert_eq!(no_id.body_json().unwrap()["error"], "user_id required");

        let no_fields = handle(&state, Event::new(Method::PUT).with_json(&json!({ "id": 1 }))).await;
        assert_eq!(no_fields.status_code, 400);
        assert_eq!(no_fields.body_json().unwrap()["error"], "No fields to update");

        let unknown = handle(
            &state,
            Event::new(Method::PUT).with_json(&json!({ "id": 404, "name": "x" })),
        )
        .await;
        assert_eq!(unknown.status_code, 404);
    }

    #[tokio::test]
    async fn test_update_sets_expiry_and_clears_name() {
        let (state, _dir) = testing::state();
        let created = create(&state, json!({ "email": "cy@example.com", "name": "Cy" }))
            .await
            .body_json()
            .unwrap();

        let response = handle(
            &state,
            Event::new(Method::PUT).with_json(&json!({
                "id": created["id"],
                "name": null,
                "subscription_expires_at": "2030-01-01T00:00:00Z"
            })),
        )
        .await;

        assert_eq!(response.status_code, 200);
        let user = response.body_json().unwrap();
        assert!(user["name"].is_null());
        assert_eq!(user["subscription_expires_at"], "2030-01-01T00:00:00Z");
        assert_eq!(user["subscription_plan"], "demo");
    }

    #[tokio::test]
    async fn test_unsupported_method_and_malformed_body() {
        let (state, _dir) = testing::state();

        let delete = handle(&state, Event::new(Method::DELETE)).await;
        assert_eq!(delete.status_code, 405);
        assert_eq!(delete.body_json().unwrap()["error"], "Method not allowed");

        let malformed = handle(&state, Event::new(Method::POST).with_body("{oops")).await;
        assert_eq!(malformed.status_code, 500);
        assert!(malformed.body_json().unwrap()["error"].is_string());
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let (state, _dir) = testing::state();

        let response = handle(&state, Event::new(Method::OPTIONS).with_body("{oops")).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_eq!(
            response.headers["Access-Control-Allow-Methods"],
            "GET, POST, PUT, OPTIONS"
        );
    }
}
