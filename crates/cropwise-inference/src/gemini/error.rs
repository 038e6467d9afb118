//! Gemini-specific error handling.

use cropwise_core::Error;

/// Gemini error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Missing, invalid, or unauthorized API key.
    AuthenticationError,
    /// Quota or rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Malformed request or rejected prompt.
    InvalidRequest,
    /// Server error or overload.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and the envelope's `status` field.
    pub fn from_response(status: u16, error_status: &str) -> Self {
        match (status, error_status) {
            (401, _) | (403, _) | (_, "UNAUTHENTICATED") | (_, "PERMISSION_DENIED") => {
                Self::AuthenticationError
            }
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::RateLimitExceeded,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) => Self::InvalidRequest,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }
}

/// Convert a Gemini error to a cropwise Error.
pub fn to_cropwise_error(code: GeminiErrorCode, message: &str) -> Error {
    match code {
        GeminiErrorCode::AuthenticationError => {
            Error::Config(format!("Gemini authentication failed: {}", message))
        }
        GeminiErrorCode::ModelNotFound => {
            Error::Config(format!("Gemini model not found: {}", message))
        }
        GeminiErrorCode::RateLimitExceeded => {
            Error::ExternalService(format!("Rate limit exceeded: {}", message))
        }
        GeminiErrorCode::InvalidRequest => {
            Error::ExternalService(format!("Request rejected: {}", message))
        }
        GeminiErrorCode::ServerError => {
            Error::ExternalService(format!("Server error: {}", message))
        }
        GeminiErrorCode::Unknown => Error::ExternalService(message.to_string()),
    }
}
