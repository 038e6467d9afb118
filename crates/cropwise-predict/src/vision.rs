//! Pest image classification.
//!
//! Images are decoded, converted to RGB, resized to the model's square input
//! with nearest-neighbour sampling, and scaled to `[0, 1]`. The model runs
//! behind [`PestModel`] so the classifier does not depend on a particular
//! runtime.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use cropwise_core::defaults::{IMAGE_SIZE, SLOW_CLASSIFY_MS, UNKNOWN_PEST};
use cropwise_core::{ClassificationResult, Error, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::{debug, instrument, trace, warn};

/// A single preprocessed image, laid out `[1, size, size, 3]` (NHWC).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub data: Vec<f32>,
    pub size: u32,
}

impl ImageTensor {
    /// Tensor shape including the batch dimension.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.size as usize, self.size as usize, 3]
    }

    /// Resize and normalize a decoded image.
    pub fn preprocess(img: &DynamicImage, size: u32) -> Self {
        let rgb = img.to_rgb8();
        let resized = image::imageops::resize(&rgb, size, size, FilterType::Nearest);
        let data = resized
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / 255.0)
            .collect();
        Self { data, size }
    }
}

/// A loaded vision model producing one probability per class.
pub trait PestModel: Send + Sync {
    /// Number of classes in the output vector.
    fn output_width(&self) -> usize;

    /// Square input edge length in pixels.
    fn input_size(&self) -> u32 {
        IMAGE_SIZE
    }

    /// Run one forward pass.
    fn infer(&self, input: &ImageTensor) -> Result<Vec<f32>>;
}

/// Classifier pairing a vision model with its label vocabulary.
#[derive(Clone)]
pub struct ImageClassifier {
    model: Arc<dyn PestModel>,
    labels: Vec<String>,
}

impl std::fmt::Debug for ImageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageClassifier")
            .field("output_width", &self.model.output_width())
            .field("labels", &self.labels.len())
            .finish()
    }
}

impl ImageClassifier {
    /// Pair a model with labels. The model's output width must match.
    pub fn new(model: Arc<dyn PestModel>, labels: Vec<String>) -> Result<Self> {
        if model.output_width() != labels.len() {
            return Err(Error::ModelLoad(format!(
                "Vision model has {} outputs but {} labels are configured",
                model.output_width(),
                labels.len()
            )));
        }
        Ok(Self { model, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Decode and classify an image file.
    ///
    /// The format is detected from the file's leading bytes, so the file's
    /// extension does not have to match its content.
    #[instrument(
        skip(self, path),
        fields(subsystem = "predict", component = "vision", op = "classify")
    )]
    pub fn classify(&self, path: &Path) -> Result<ClassificationResult> {
        let img = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| Error::Inference(format!("Failed to read image: {}", e)))?
            .decode()
            .map_err(|e| Error::Inference(format!("Failed to decode image: {}", e)))?;
        self.classify_image(&img)
    }

    /// Classify an already decoded image.
    pub fn classify_image(&self, img: &DynamicImage) -> Result<ClassificationResult> {
        let start = Instant::now();
        let tensor = ImageTensor::preprocess(img, self.model.input_size());
        let probs = self.model.infer(&tensor)?;
        trace!(output_len = probs.len(), "Raw model output");

        let result = select(&probs, &self.labels)?;
        let duration_ms = start.elapsed().as_millis() as u64;
        if duration_ms > SLOW_CLASSIFY_MS {
            warn!(duration_ms, slow = true, "Slow pest classification");
        }
        debug!(
            label = %result.label,
            confidence = result.confidence,
            duration_ms,
            "Pest classified"
        );
        Ok(result)
    }
}

/// Arg-max over the probability vector, mapped to a label.
///
/// An index outside the vocabulary maps to the "Unknown Pest" sentinel. NaN
/// entries never win.
fn select(probs: &[f32], labels: &[String]) -> Result<ClassificationResult> {
    let (idx, max) = probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
            Some((_, b)) if b >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| Error::Inference("Vision model produced no usable output".to_string()))?;

    let label = labels
        .get(idx)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_PEST.to_string());

    Ok(ClassificationResult {
        label,
        confidence: (max as f64).clamp(0.0, 1.0),
    })
}
