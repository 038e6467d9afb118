//! Per-feature categorical encoders.
//!
//! Each encoder is the exported `classes_` list of a fitted label encoder:
//! the integer code of a value is its position in that list. Encoding is a
//! strict lookup; an unseen value is an error rather than a guessed code.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use cropwise_core::{Error, Result};
use tracing::info;

/// Bijection between the known values of one feature and integer codes.
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    feature: String,
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoricalEncoder {
    /// Build an encoder from its fitted class list.
    pub fn new(feature: impl Into<String>, classes: Vec<String>) -> Result<Self> {
        let feature = feature.into();
        if classes.is_empty() {
            return Err(Error::ModelLoad(format!(
                "Encoder for {} has no classes",
                feature
            )));
        }

        let mut index = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), code).is_some() {
                return Err(Error::ModelLoad(format!(
                    "Encoder for {} lists class {:?} twice",
                    feature, class
                )));
            }
        }

        Ok(Self {
            feature,
            classes,
            index,
        })
    }

    /// Code for a known value, or `UnknownCategory`.
    pub fn encode(&self, value: &str) -> Result<usize> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| Error::UnknownCategory {
                feature: self.feature.clone(),
                value: value.to_string(),
            })
    }

    /// Value for a code, if in range.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// The encoders of every categorical feature, keyed by feature name.
#[derive(Debug, Clone, Default)]
pub struct EncoderSet {
    encoders: HashMap<String, CategoricalEncoder>,
}

impl EncoderSet {
    /// Build from a feature → classes mapping.
    pub fn from_classes(classes: BTreeMap<String, Vec<String>>) -> Result<Self> {
        let encoders = classes
            .into_iter()
            .map(|(feature, classes)| {
                let encoder = CategoricalEncoder::new(feature.clone(), classes)?;
                Ok((feature, encoder))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { encoders })
    }

    /// Load the exported `{"feature": ["class", ...]}` document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ModelLoad(format!("Failed to read encoders {}: {}", path.display(), e))
        })?;
        let classes: BTreeMap<String, Vec<String>> = serde_json::from_str(&text).map_err(|e| {
            Error::ModelLoad(format!("Invalid encoders {}: {}", path.display(), e))
        })?;
        let set = Self::from_classes(classes)?;
        info!(
            path = %path.display(),
            encoder_count = set.len(),
            "Loaded categorical encoders"
        );
        Ok(set)
    }

    pub fn get(&self, feature: &str) -> Option<&CategoricalEncoder> {
        self.encoders.get(feature)
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.encoders.contains_key(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
