//! Gemini generative backend.
//!
//! Calls the Generative Language API `generateContent` endpoint with a single
//! user turn, the four standard harm categories blocked at low and above, and
//! the configured sampling temperature. Transport failures and 429/5xx
//! responses are retried at most `max_retries` times.
//!
//! # Example
//!
//! ```rust,no_run
//! use cropwise_inference::gemini::{GeminiBackend, GeminiConfig};
//! use cropwise_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GeminiConfig::new(std::env::var("GEMINI_API_KEY").unwrap());
//!     let backend = GeminiBackend::new(config).unwrap();
//!     let document = backend.generate("Hello").await.unwrap();
//!     println!("{}", document);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{GeminiBackend, GeminiConfig};
pub use error::{to_cropwise_error, GeminiErrorCode};
pub use types::*;
