//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

/// Errors returned by handlers, rendered as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a core error to a response class.
    ///
    /// Validation failures and missing advisor fields are always 400.
    /// Feature-encoding errors are 500 unless `strict_input_errors` is set,
    /// which makes them 400. Everything else is 500 with the error's message.
    pub fn from_core(err: cropwise_core::Error, strict_input_errors: bool) -> Self {
        match err {
            cropwise_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            e @ cropwise_core::Error::MissingField(_) => ApiError::BadRequest(e.to_string()),
            e if e.is_caller_input() && strict_input_errors => ApiError::BadRequest(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::PayloadTooLarge(msg) => {
                warn!(
                    subsystem = "api",
                    status = status.as_u16(),
                    error = %msg,
                    "Rejected request"
                );
                msg
            }
            ApiError::Internal(msg) => {
                error!(subsystem = "api", error = %msg, "Request failed");
                msg
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
