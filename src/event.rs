//! The HTTP-like event every handler consumes and the response it produces.
//!
//! Handlers never see axum types directly: the router adapts each request
//! into an [`Event`] and turns the [`EventResponse`] back into HTTP.

use axum::{
    body::{Body, Bytes},
    http::{HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

use crate::errors::{AppError, Result};

/// CORS preflight answer advertised by a handler.
#[derive(Debug, Clone, Copy)]
pub struct Cors {
    pub methods: &'static str,
    pub headers: &'static str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub http_method: Option<String>,
    /// Raw body bytes; the gateway shape carries them as a JSON string.
    #[serde(default, deserialize_with = "body_from_string")]
    pub body: Option<Vec<u8>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub path_params: Option<HashMap<String, String>>,
}

impl Event {
    pub fn new(method: Method) -> Self {
        Self {
            http_method: Some(method.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn from_http(
        method: Method,
        query: HashMap<String, String>,
        path: HashMap<String, String>,
        body: Bytes,
    ) -> Self {
        Self {
            http_method: Some(method.as_str().to_string()),
            body: Some(body.to_vec()),
            query_string_parameters: Some(query),
            path_params: Some(path),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_body(value.to_string())
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_path_param(mut self, key: &str, value: &str) -> Self {
        self.path_params
            .get_or_insert_with(HashMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Method of the event, or `default` when the event carries none.
    pub fn method(&self, default: Method) -> Result<Method> {
        match self.http_method.as_deref() {
            None => Ok(default),
            Some(method) => {
                Method::from_bytes(method.as_bytes()).map_err(|_| AppError::MethodNotAllowed)
            }
        }
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method.as_deref() == Some("OPTIONS")
    }

    /// Non-empty query parameter.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Non-empty path parameter.
    pub fn path_param(&self, key: &str) -> Option<&str> {
        self.path_params
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Deserializes the JSON body; an absent or blank body reads as `{}`.
    /// Bytes that are not UTF-8 JSON fail like any other malformed body.
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = match self.body.as_deref() {
            Some(body) if !body.iter().all(u8::is_ascii_whitespace) => body,
            _ => b"{}".as_slice(),
        };
        Ok(serde_json::from_slice(raw)?)
    }
}

fn body_from_string<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|body| body.map(String::into_bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl EventResponse {
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Result<Self> {
        let body = serde_json::to_string(payload)?;
        Ok(Self::with_json_body(status, body))
    }

    pub fn ok<T: Serialize>(payload: &T) -> Result<Self> {
        Self::json(StatusCode::OK, payload)
    }

    pub fn created<T: Serialize>(payload: &T) -> Result<Self> {
        Self::json(StatusCode::CREATED, payload)
    }

    pub fn error(error: &AppError) -> Self {
        let body = json!({ "error": error.to_string() }).to_string();
        Self::with_json_body(error.status_code(), body)
    }

    pub fn preflight(cors: &Cors) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Access-Control-Allow-Methods".to_string(), cors.methods.to_string());
        headers.insert("Access-Control-Allow-Headers".to_string(), cors.headers.to_string());

        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: String::new(),
        }
    }

    fn with_json_body(status: StatusCode, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    pub fn body_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl IntoResponse for EventResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header {}", name),
            }
        }

        response
    }
}
