//! Centralized default constants for the cropwise service.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 5000;

/// Directory for request-scoped upload files.
pub const UPLOAD_DIR: &str = "uploads";

/// Maximum accepted request body (16 MiB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Origins allowed by CORS when `ALLOWED_ORIGINS` is unset.
pub const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:8080",
    "http://localhost:3000",
];

/// Image extensions accepted by the analysis endpoint.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

// =============================================================================
// ARTIFACTS
// =============================================================================

/// Vision model (ONNX export).
pub const PEST_MODEL_PATH: &str = "artifacts/pest_model.onnx";

/// Pest name → pesticide table.
pub const PESTICIDE_CSV_PATH: &str = "artifacts/Pesticides_lowercase.csv";

/// Yield regressor export.
pub const YIELD_MODEL_PATH: &str = "artifacts/crop_yield_model.json";

/// Fitted scaler export.
pub const YIELD_SCALER_PATH: &str = "artifacts/scaler.json";

/// Per-feature label encoder export.
pub const YIELD_ENCODERS_PATH: &str = "artifacts/label_encoders.json";

// =============================================================================
// VISION
// =============================================================================

/// Square input resolution expected by the pest classifier.
pub const IMAGE_SIZE: u32 = 224;

/// Label returned when the arg-max index falls outside the vocabulary.
pub const UNKNOWN_PEST: &str = "Unknown Pest";

/// Confidence strictly above this is "high" severity.
pub const SEVERITY_HIGH_THRESHOLD: f64 = 0.8;

/// Confidence strictly above this (and not high) is "medium" severity.
pub const SEVERITY_MEDIUM_THRESHOLD: f64 = 0.5;

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// Upper bound on remedy entries per category.
pub const MAX_REMEDIES: usize = 3;

/// Description attached to every table-backed pesticide entry.
pub const PESTICIDE_DESCRIPTION: &str = "Recommended pesticide for the detected pest.";

/// Unit reported alongside yield predictions.
pub const YIELD_UNIT: &str = "kg per hectare";

/// Error string carried by a degraded advisory result.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response";

// =============================================================================
// GENERATIVE ADVISOR
// =============================================================================

/// Gemini REST endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model.
pub const GEMINI_MODEL: &str = "gemini-1.5-pro";

/// Low sampling temperature; favors determinism over creativity.
pub const GEMINI_TEMPERATURE: f32 = 0.3;

/// Request timeout for a single generation call (seconds).
pub const GEMINI_TIMEOUT_SECS: u64 = 60;

/// Retries after the first attempt, transient failures only.
pub const GEMINI_MAX_RETRIES: u32 = 1;

/// Delay before the retry (milliseconds).
pub const GEMINI_RETRY_DELAY_MS: u64 = 500;

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Generation calls slower than this are logged as slow.
pub const SLOW_GENERATION_MS: u64 = 30_000;

/// Vision inference slower than this is logged as slow.
pub const SLOW_CLASSIFY_MS: u64 = 2_000;

// =============================================================================
// ENVIRONMENT VARIABLE NAMES
// =============================================================================

pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_PEST_MODEL_PATH: &str = "PEST_MODEL_PATH";
pub const ENV_PEST_LABELS_PATH: &str = "PEST_LABELS_PATH";
pub const ENV_PESTICIDE_CSV_PATH: &str = "PESTICIDE_CSV_PATH";
pub const ENV_YIELD_MODEL_PATH: &str = "YIELD_MODEL_PATH";
pub const ENV_YIELD_SCALER_PATH: &str = "YIELD_SCALER_PATH";
pub const ENV_YIELD_ENCODERS_PATH: &str = "YIELD_ENCODERS_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_TEMPERATURE: &str = "GEMINI_TEMPERATURE";
pub const ENV_GEMINI_TIMEOUT_SECS: &str = "GEMINI_TIMEOUT_SECS";
pub const ENV_GEMINI_MAX_RETRIES: &str = "GEMINI_MAX_RETRIES";
pub const ENV_STRICT_INPUT_ERRORS: &str = "STRICT_INPUT_ERRORS";
