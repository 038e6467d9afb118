//! Request orchestration for the three advisory paths.
//!
//! Each path validates its input, calls the relevant model component, and
//! shapes the result. Paths share only the read-only [`ModelContext`] and the
//! advisor, so a failure in one never affects another.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use cropwise_core::file_safety::{image_extension, sanitize_filename};
use cropwise_core::{
    logging, AnalysisResponse, Error, FertilizerResponse, FieldMap, Recommendations, Result,
    Severity, YieldResponse,
};
use cropwise_inference::GenerativeAdvisor;
use cropwise_predict::ModelContext;
use tracing::{debug, info, instrument, Span};

pub const NO_SELECTED_FILE: &str = "No selected file";
pub const INVALID_FILE_TYPE: &str = "Invalid file type";
pub const NO_DATA_PROVIDED: &str = "No data provided";

/// Coordinates classifiers, lookup, regression, and the generative advisor.
#[derive(Clone)]
pub struct Orchestrator {
    context: ModelContext,
    advisor: GenerativeAdvisor,
    upload_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(context: ModelContext, advisor: GenerativeAdvisor, upload_dir: PathBuf) -> Self {
        Self {
            context,
            advisor,
            upload_dir,
        }
    }

    pub fn context(&self) -> &ModelContext {
        &self.context
    }

    pub fn advisor(&self) -> &GenerativeAdvisor {
        &self.advisor
    }

    /// Classify an uploaded image and attach lookup remedies.
    ///
    /// The bytes are written to a temporary file inside the upload directory
    /// that is removed when this call returns, on success or failure.
    #[instrument(
        skip(self, bytes),
        fields(
            subsystem = "api",
            component = "orchestrator",
            op = "analyze",
            size = bytes.len(),
            label = tracing::field::Empty,
            confidence = tracing::field::Empty,
            remedy_count = tracing::field::Empty,
            duration_ms = tracing::field::Empty
        )
    )]
    pub async fn analyze_image(&self, filename: &str, bytes: Vec<u8>) -> Result<AnalysisResponse> {
        if filename.is_empty() {
            return Err(Error::Validation(NO_SELECTED_FILE.to_string()));
        }
        let ext = image_extension(filename)
            .ok_or_else(|| Error::Validation(INVALID_FILE_TYPE.to_string()))?;

        let mut upload = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&format!(".{}", ext))
            .tempfile_in(&self.upload_dir)?;
        upload.write_all(&bytes)?;
        upload.flush()?;
        debug!(
            filename = %sanitize_filename(filename),
            path = %upload.path().display(),
            "Stored upload"
        );

        let start = Instant::now();
        let classifier = self.context.classifier().clone();
        let classification = tokio::task::spawn_blocking(move || {
            let result = classifier.classify(upload.path());
            drop(upload);
            result
        })
        .await
        .map_err(|e| Error::Internal(format!("Classification task failed: {}", e)))??;

        let duration_ms = start.elapsed().as_millis() as u64;
        let severity = Severity::from_confidence(classification.confidence);
        let pesticides = self.context.remedies().recommend(&classification.label);

        let span = Span::current();
        span.record(logging::LABEL, classification.label.as_str());
        span.record(logging::CONFIDENCE, classification.confidence);
        span.record(logging::REMEDY_COUNT, pesticides.len());
        span.record(logging::DURATION_MS, duration_ms);

        info!(
            label = %classification.label,
            confidence = classification.confidence,
            severity = %severity,
            remedy_count = pesticides.len(),
            duration_ms,
            "Image analyzed"
        );

        Ok(AnalysisResponse {
            pest_name: classification.label,
            confidence: classification.confidence,
            severity,
            recommendations: Recommendations {
                pesticides,
                fertilizers: Vec::new(),
            },
        })
    }

    /// Predict crop yield from a field mapping.
    pub fn predict_yield(&self, fields: &FieldMap) -> Result<YieldResponse> {
        if fields.is_empty() {
            return Err(Error::Validation(NO_DATA_PROVIDED.to_string()));
        }
        let prediction = self.context.tabular().predict(fields)?;
        Ok(YieldResponse::new(prediction))
    }

    /// Ask the generative advisor for pest, pesticide, and fertilizer advice.
    pub async fn recommend_fertilizer(&self, fields: &FieldMap) -> Result<FertilizerResponse> {
        if fields.is_empty() {
            return Err(Error::Validation(NO_DATA_PROVIDED.to_string()));
        }
        let recommendations = self.advisor.advise(fields).await?;
        Ok(FertilizerResponse { recommendations })
    }
}
