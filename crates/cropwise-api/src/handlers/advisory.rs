//! Fertilizer and pesticide advisory handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use cropwise_core::FertilizerResponse;

use super::parse_fields;
use crate::error::ApiError;
use crate::state::AppState;

/// Generate advice from crop, environment, and soil nutrient fields.
///
/// A model reply that cannot be parsed is still a 200, carrying
/// `{error, rawText}` under `recommendations`.
pub async fn recommend_fertilizer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FertilizerResponse>, ApiError> {
    let fields = parse_fields(&body)?;
    state
        .orchestrator
        .recommend_fertilizer(&fields)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core(e, state.strict_input_errors))
}
