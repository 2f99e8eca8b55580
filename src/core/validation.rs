//! Payload validation helpers shared by the resource handlers.
//!
//! Required means present and not null. Zero and empty-string values are
//! legitimate data and pass every check here; only absence and `null` are
//! rejected.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::error::ApiError;

/// Check that `body` carries every field in `required`, none of them null.
///
/// All missing fields are reported in a single error so the caller sees
/// the whole problem at once.
pub fn check_required(body: &Value, required: &[&str]) -> Result<(), ApiError> {
    let Some(map) = body.as_object() else {
        return Err(ApiError::Validation(
            "Expected a JSON object".to_string(),
        ));
    };

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| map.get(*field).is_none_or(Value::is_null))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Interpret `body` as a JSON object, rejecting any other shape.
pub fn object_payload(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Validation(
            "Expected a JSON object".to_string(),
        )),
    }
}

/// A string field value out of a patch document.
pub fn string_field(field: &str, value: &Value) -> Result<String, ApiError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("Field '{field}' must be a string")))
}

/// A numeric field value out of a patch document.
pub fn number_field(field: &str, value: &Value) -> Result<f64, ApiError> {
    value
        .as_f64()
        .ok_or_else(|| ApiError::Validation(format!("Field '{field}' must be a number")))
}

/// Trim surrounding whitespace off a string field before storage.
pub fn trimmed(value: String) -> String {
    value.trim().to_string()
}

/// Trim an optional string field.
pub fn trimmed_opt(value: Option<String>) -> Option<String> {
    value.map(trimmed)
}

/// Parse a date field accepting RFC 3339 or a plain `YYYY-MM-DD` date.
///
/// Bare dates are read as midnight UTC.
pub fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ApiError::Validation(format!(
        "Field '{field}' must be an RFC 3339 timestamp or a YYYY-MM-DD date"
    )))
}

/// Parse a path identifier.
///
/// A malformed id can never name a record, so it surfaces as NotFound for
/// the resource rather than as a validation failure.
pub fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound { resource })
}
