//! # cropwise-predict
//!
//! Local predictive models for the cropwise advisory service.
//!
//! This crate provides:
//! - Categorical encoders, a fitted standard scaler, and regression models
//!   loaded from exported training artifacts
//! - The feature encoder and tabular yield predictor built on them
//! - The pest image classifier and its label vocabulary
//! - The pest → pesticide lookup recommender
//! - [`ModelContext`], the immutable bundle of everything loaded at startup
//!
//! # Feature Flags
//!
//! - `onnx` (default): Enable the ONNX runtime backend for the vision model

pub mod context;
pub mod encoder;
pub mod labels;
pub mod lookup;
pub mod regressor;
pub mod scaler;
pub mod tabular;
pub mod vision;

#[cfg(feature = "onnx")]
pub mod onnx;

pub use context::ModelContext;
pub use encoder::{CategoricalEncoder, EncoderSet};
pub use labels::{default_labels, load_labels, PEST_LABELS};
pub use lookup::LookupRecommender;
pub use regressor::{Aggregation, RegressionModel, RegressionTree, TreeNode};
pub use scaler::StandardScaler;
pub use tabular::{FeatureEncoder, FeatureVector, TabularPredictor};
pub use vision::{ImageClassifier, ImageTensor, PestModel};

#[cfg(feature = "onnx")]
pub use onnx::OnnxPestModel;
