//! Request field helpers shared by the handlers' request records.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::{AppError, Result};

/// Distinguishes a key set to `null` (`Some(None)`) from an absent key
/// (`None`, via `#[serde(default)]`).
pub fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reads an identifier given as a JSON number or a numeric string.
/// Missing, null, empty and zero values count as absent.
pub fn optional_id(field: &str, value: Option<&Value>) -> Result<Option<i64>> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(None),
            Some(id) => Ok(Some(id)),
            None => Err(not_an_integer(field)),
        },
        Some(Value::String(text)) => parse_id(field, text),
        Some(_) => Err(not_an_integer(field)),
    }
}

pub fn require_id(field: &str, value: Option<&Value>) -> Result<i64> {
    optional_id(field, value)?.ok_or_else(|| AppError::validation(format!("{} required", field)))
}

/// Identifier from a query or path parameter.
pub fn parse_id(field: &str, text: &str) -> Result<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<i64>() {
        Ok(0) => Ok(None),
        Ok(id) => Ok(Some(id)),
        Err(_) => Err(not_an_integer(field)),
    }
}

fn not_an_integer(field: &str) -> AppError {
    AppError::validation(format!("{} must be an integer", field))
}

/// Non-empty string field.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
