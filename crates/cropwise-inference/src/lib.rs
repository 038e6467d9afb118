//! # cropwise-inference
//!
//! Generative advisory backend for the cropwise service.
//!
//! This crate provides:
//! - The Gemini `generateContent` backend with bounded retry
//! - The [`GenerativeAdvisor`]: prompt rendering, payload extraction, code
//!   fence stripping, and tolerant parsing into an advisory
//! - A mock backend for tests (feature `mock`)
//!
//! # Feature Flags
//!
//! - `mock`: Export [`mock::MockGenerationBackend`] to dependent crates
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cropwise_inference::{GeminiBackend, GeminiConfig, GenerativeAdvisor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::new(GeminiConfig::new("api-key")).unwrap();
//!     let advisor = GenerativeAdvisor::new(Arc::new(backend));
//!     let fields = serde_json::json!({
//!         "crop_name": "Rice", "temperature": 30, "humidity": 80, "moisture": 40,
//!         "soil_type": "Clayey", "nitrogen": 20, "phosphorus": 10, "potassium": 10
//!     });
//!     let result = advisor.advise(fields.as_object().unwrap()).await.unwrap();
//!     println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! }
//! ```

pub mod advisor;
pub mod gemini;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use advisor::{GenerativeAdvisor, REQUIRED_FIELDS};
pub use gemini::{GeminiBackend, GeminiConfig, GeminiErrorCode};
