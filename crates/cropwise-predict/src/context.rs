//! Startup bundle of every loaded model artifact.
//!
//! The context is built once, before the server accepts requests, and is
//! shared read-only afterwards. Any artifact failing to load aborts startup.

use std::sync::Arc;
use std::time::Instant;

use cropwise_core::config::ArtifactPaths;
use cropwise_core::Result;
use tracing::info;

use crate::labels::{default_labels, load_labels};
use crate::lookup::LookupRecommender;
use crate::tabular::TabularPredictor;
use crate::vision::{ImageClassifier, PestModel};

/// Loaded models shared by all request handlers.
#[derive(Debug, Clone)]
pub struct ModelContext {
    tabular: Arc<TabularPredictor>,
    classifier: Arc<ImageClassifier>,
    remedies: Arc<LookupRecommender>,
}

impl ModelContext {
    pub fn new(
        tabular: TabularPredictor,
        classifier: ImageClassifier,
        remedies: LookupRecommender,
    ) -> Self {
        Self {
            tabular: Arc::new(tabular),
            classifier: Arc::new(classifier),
            remedies: Arc::new(remedies),
        }
    }

    /// Load all artifacts using the ONNX vision backend.
    #[cfg(feature = "onnx")]
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let model = crate::onnx::OnnxPestModel::load(&paths.pest_model)?;
        Self::load_with_model(paths, Arc::new(model))
    }

    /// Load the tabular and lookup artifacts, pairing them with an already
    /// constructed vision model.
    pub fn load_with_model(paths: &ArtifactPaths, model: Arc<dyn PestModel>) -> Result<Self> {
        let start = Instant::now();

        let labels = match &paths.pest_labels {
            Some(path) => load_labels(path)?,
            None => default_labels(),
        };
        let classifier = ImageClassifier::new(model, labels)?;
        let tabular = TabularPredictor::load(
            &paths.yield_model,
            &paths.yield_scaler,
            &paths.yield_encoders,
        )?;
        let remedies = LookupRecommender::from_csv(&paths.pesticide_csv)?;

        info!(
            subsystem = "predict",
            label_count = classifier.labels().len(),
            feature_count = tabular.feature_names().len(),
            remedy_entries = remedies.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Model context loaded"
        );

        Ok(Self::new(tabular, classifier, remedies))
    }

    pub fn tabular(&self) -> &Arc<TabularPredictor> {
        &self.tabular
    }

    pub fn classifier(&self) -> &Arc<ImageClassifier> {
        &self.classifier
    }

    pub fn remedies(&self) -> &Arc<LookupRecommender> {
        &self.remedies
    }
}
