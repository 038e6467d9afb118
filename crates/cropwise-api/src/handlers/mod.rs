//! HTTP handlers.

pub mod advisory;
pub mod analyze;
pub mod health;
pub mod yield_prediction;

use axum::body::Bytes;
use cropwise_core::FieldMap;

use crate::error::ApiError;
use crate::services::orchestrator::NO_DATA_PROVIDED;

/// Read a JSON request body as a field mapping.
///
/// An empty body, `null`, or `{}` is "No data provided".
pub(crate) fn parse_fields(body: &Bytes) -> Result<FieldMap, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest(NO_DATA_PROVIDED.to_string()));
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    match value {
        serde_json::Value::Object(map) if !map.is_empty() => Ok(map),
        serde_json::Value::Object(_) | serde_json::Value::Null => {
            Err(ApiError::BadRequest(NO_DATA_PROVIDED.to_string()))
        }
        _ => Err(ApiError::BadRequest(
            "Expected a JSON object of named fields".to_string(),
        )),
    }
}
