//! # cropwise-core
//!
//! Core types, traits, and abstractions for the cropwise advisory service.
//!
//! This crate provides the result contracts returned to callers, the shared
//! error type, and the trait seams that the prediction, inference, and API
//! crates plug into.

pub mod config;
pub mod defaults;
pub mod error;
pub mod fields;
pub mod file_safety;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{AppConfig, ConfigError};
pub use error::{Error, Result};
pub use fields::{FieldMap, FieldValue};
pub use file_safety::{image_extension, sanitize_filename};
pub use models::*;
pub use traits::*;
