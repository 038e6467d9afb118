//! Fitted standard scaler.
//!
//! The scaler's feature list is the authoritative schema of the yield model:
//! it fixes both the length and the order of every feature vector.

use std::path::Path;

use cropwise_core::{Error, Result};
use serde::Deserialize;
use tracing::info;

/// Per-feature affine normalization `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// On-disk export. `mean`/`scale` are absent when the scaler was fitted with
/// centering or scaling disabled.
#[derive(Deserialize)]
struct ScalerExport {
    feature_names: Vec<String>,
    #[serde(default)]
    mean: Option<Vec<f64>>,
    #[serde(default)]
    scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new(feature_names: Vec<String>, mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let n = feature_names.len();
        if n == 0 {
            return Err(Error::ModelLoad("Scaler declares no features".to_string()));
        }
        if mean.len() != n || scale.len() != n {
            return Err(Error::ModelLoad(format!(
                "Scaler has {} features but {} means and {} scales",
                n,
                mean.len(),
                scale.len()
            )));
        }

        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = feature_names.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(Error::ModelLoad(format!(
                "Scaler declares feature {} twice",
                dup
            )));
        }

        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err(Error::ModelLoad(
                "Scaler parameters must be finite".to_string(),
            ));
        }

        // Constant features are fitted with scale 0; they pass through unscaled.
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();

        Ok(Self {
            feature_names,
            mean,
            scale,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ModelLoad(format!("Failed to read scaler {}: {}", path.display(), e))
        })?;
        let export: ScalerExport = serde_json::from_str(&text).map_err(|e| {
            Error::ModelLoad(format!("Invalid scaler {}: {}", path.display(), e))
        })?;

        let n = export.feature_names.len();
        let scaler = Self::new(
            export.feature_names,
            export.mean.unwrap_or_else(|| vec![0.0; n]),
            export.scale.unwrap_or_else(|| vec![1.0; n]),
        )?;
        info!(
            path = %path.display(),
            feature_count = scaler.len(),
            "Loaded feature scaler"
        );
        Ok(scaler)
    }

    /// Declared feature order.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    /// Normalize a vector in declared order.
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != self.len() {
            return Err(Error::Internal(format!(
                "Scaler expects {} values, got {}",
                self.len(),
                values.len()
            )));
        }
        Ok(values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }
}
