//! Crop yield prediction handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use cropwise_core::YieldResponse;

use super::parse_fields;
use crate::error::ApiError;
use crate::state::AppState;

/// Predict yield from a JSON mapping of feature name to value.
///
/// # Returns
/// - 200 OK with `{prediction, unit}`
/// - 400 Bad Request for an empty body, and for encoding failures when
///   strict input errors are enabled
/// - 500 Internal Server Error otherwise
pub async fn predict_yield(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<YieldResponse>, ApiError> {
    let fields = parse_fields(&body)?;
    state
        .orchestrator
        .predict_yield(&fields)
        .map(Json)
        .map_err(|e| ApiError::from_core(e, state.strict_input_errors))
}
