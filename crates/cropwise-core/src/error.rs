//! Error types for cropwise.

use thiserror::Error;

/// Result type alias using cropwise's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for cropwise operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad or missing request data
    #[error("{0}")]
    Validation(String),

    /// A categorical feature required by the yield model was not supplied
    #[error("Missing required categorical feature: {0}")]
    MissingFeature(String),

    /// A categorical value was not seen when the encoder was fitted
    #[error("Invalid value for {feature}: {value}")]
    UnknownCategory { feature: String, value: String },

    /// A numeric feature was present but could not be read as a number
    #[error("Invalid numeric value for {feature}: {value}")]
    InvalidNumeric { feature: String, value: String },

    /// A field required by the fertilizer advisor was not supplied
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A startup artifact could not be loaded or failed validation
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// The external generative service failed or was unreachable
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Local model inference failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by caller-supplied data rather than server state.
    pub fn is_caller_input(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::MissingFeature(_)
                | Error::UnknownCategory { .. }
                | Error::InvalidNumeric { .. }
                | Error::MissingField(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ExternalService(e.to_string())
    }
}
