//! Pest image analysis handler.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use cropwise_core::AnalysisResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

pub const NO_IMAGE_PROVIDED: &str = "No image provided";

fn upload_error(context: &str, err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(crate::PAYLOAD_TOO_LARGE.to_string())
    } else {
        ApiError::BadRequest(format!("{}: {}", context, err))
    }
}

/// Classify an uploaded pest image.
///
/// # Request
/// Multipart form with an `image` file field (png, jpg, jpeg).
///
/// # Returns
/// - 200 OK with pest name, confidence, severity, and pesticide suggestions
/// - 400 Bad Request if the image is absent, unnamed, or of a disallowed type
/// - 413 Payload Too Large if the upload exceeds the body limit
/// - 500 Internal Server Error if the image cannot be classified
pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    // A body that is not multipart cannot carry an image field.
    let mut multipart =
        multipart.map_err(|_| ApiError::BadRequest(NO_IMAGE_PROVIDED.to_string()))?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read upload", e))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| upload_error("Failed to read file data", e))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest(NO_IMAGE_PROVIDED.to_string()))?;

    state
        .orchestrator
        .analyze_image(&filename, bytes)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_core(e, state.strict_input_errors))
}
