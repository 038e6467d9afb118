//! Tabular yield prediction.
//!
//! A request is an open mapping of field name to value. The feature encoder
//! turns it into a vector ordered exactly as the scaler declares, encoding
//! categorical features through their fitted encoders and coercing the rest
//! to numbers. Extra request fields are ignored.

use std::path::Path;

use cropwise_core::fields::{numeric_value, text_value};
use cropwise_core::{logging, Error, FieldMap, Result};
use tracing::{debug, info, instrument, trace, Span};

use crate::encoder::EncoderSet;
use crate::regressor::RegressionModel;
use crate::scaler::StandardScaler;

/// An encoded, not yet scaled, feature vector in scaler order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Borrowing view that maps request fields onto the model's feature schema.
pub struct FeatureEncoder<'a> {
    scaler: &'a StandardScaler,
    encoders: &'a EncoderSet,
}

impl<'a> FeatureEncoder<'a> {
    pub fn new(scaler: &'a StandardScaler, encoders: &'a EncoderSet) -> Self {
        Self { scaler, encoders }
    }

    /// Encode a request.
    ///
    /// Categorical features must be present and known. Numeric features
    /// default to 0.0 when absent; a present value that cannot be read as a
    /// number (including `null`) is rejected.
    pub fn encode(&self, fields: &FieldMap) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.scaler.len());

        for feature in self.scaler.feature_names() {
            let value = match self.encoders.get(feature) {
                Some(encoder) => {
                    let raw = fields
                        .get(feature)
                        .ok_or_else(|| Error::MissingFeature(feature.clone()))?;
                    let code = encoder.encode(&text_value(raw))?;
                    trace!(feature = %feature, code, "Encoded categorical feature");
                    code as f64
                }
                None => match fields.get(feature) {
                    None => {
                        trace!(feature = %feature, "Numeric feature absent, using 0.0");
                        0.0
                    }
                    Some(raw) => numeric_value(raw).ok_or_else(|| Error::InvalidNumeric {
                        feature: feature.clone(),
                        value: raw.to_string(),
                    })?,
                },
            };
            values.push(value);
        }

        Ok(FeatureVector(values))
    }
}

/// Scaler, encoders, and regressor loaded as one consistent unit.
#[derive(Debug, Clone)]
pub struct TabularPredictor {
    scaler: StandardScaler,
    encoders: EncoderSet,
    model: RegressionModel,
}

impl TabularPredictor {
    /// Assemble a predictor, checking that the three artifacts agree.
    pub fn new(
        scaler: StandardScaler,
        encoders: EncoderSet,
        model: RegressionModel,
    ) -> Result<Self> {
        for feature in encoders.features() {
            if !scaler.feature_names().iter().any(|f| f == feature) {
                return Err(Error::ModelLoad(format!(
                    "Encoder for {} has no matching scaler feature",
                    feature
                )));
            }
        }
        model.validate(scaler.len())?;

        Ok(Self {
            scaler,
            encoders,
            model,
        })
    }

    pub fn load(model_path: &Path, scaler_path: &Path, encoders_path: &Path) -> Result<Self> {
        let scaler = StandardScaler::load(scaler_path)?;
        let encoders = EncoderSet::load(encoders_path)?;
        let model = RegressionModel::load(model_path)?;
        let predictor = Self::new(scaler, encoders, model)?;
        info!(
            subsystem = "predict",
            component = "tabular",
            feature_count = predictor.scaler.len(),
            categorical_count = predictor.encoders.len(),
            "Yield predictor ready"
        );
        Ok(predictor)
    }

    pub fn feature_encoder(&self) -> FeatureEncoder<'_> {
        FeatureEncoder::new(&self.scaler, &self.encoders)
    }

    pub fn feature_names(&self) -> &[String] {
        self.scaler.feature_names()
    }

    /// Encode, scale, and regress one request.
    #[instrument(
        skip(self, fields),
        fields(
            subsystem = "predict",
            component = "tabular",
            op = "predict",
            feature_count = tracing::field::Empty
        )
    )]
    pub fn predict(&self, fields: &FieldMap) -> Result<f64> {
        let encoded = self.feature_encoder().encode(fields)?;
        let scaled = self.scaler.transform(encoded.as_slice())?;
        Span::current().record(logging::FEATURE_COUNT, scaled.len());
        let prediction = self.model.predict(&scaled);
        if !prediction.is_finite() {
            return Err(Error::Inference(
                "Yield model produced a non-finite prediction".to_string(),
            ));
        }
        debug!(prediction, "Yield predicted");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn fields(value: serde_json::Value) -> FieldMap {
        value.as_object().cloned().unwrap()
    }

    fn predictor() -> TabularPredictor {
        let scaler = StandardScaler::new(
            vec!["Crop".into(), "Season".into(), "Area".into(), "Rainfall".into()],
            vec![0.0, 0.0, 100.0, 0.0],
            vec![1.0, 1.0, 10.0, 1.0],
        )
        .unwrap();
        let mut classes = BTreeMap::new();
        classes.insert("Crop".to_string(), vec!["Maize".into(), "Rice".into()]);
        classes.insert("Season".to_string(), vec!["Kharif".into(), "Rabi".into()]);
        let encoders = EncoderSet::from_classes(classes).unwrap();
        let model = RegressionModel::Linear {
            coefficients: vec![100.0, 10.0, 1.0, 0.5],
            intercept: 1000.0,
        };
        TabularPredictor::new(scaler, encoders, model).unwrap()
    }

    #[test]
    fn test_encode_in_scaler_order() {
        let p = predictor();
        let v = p
            .feature_encoder()
            .encode(&fields(json!({
                "Rainfall": 12, "Area": "150", "Season": "Rabi", "Crop": "Rice", "Extra": "x"
            })))
            .unwrap();
        assert_eq!(v.as_slice(), &[1.0, 1.0, 150.0, 12.0]);
    }

    #[test]
    fn test_absent_numeric_defaults_to_zero() {
        let p = predictor();
        let v = p
            .feature_encoder()
            .encode(&fields(json!({"Crop": "Maize", "Season": "Kharif"})))
            .unwrap();
        assert_eq!(v.as_slice(), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_categorical_names_feature() {
        let p = predictor();
        let err = p
            .feature_encoder()
            .encode(&fields(json!({"Crop": "Maize", "Area": 10})))
            .unwrap_err();
        assert!(matches!(err, Error::MissingFeature(ref f) if f == "Season"));
        assert!(err.to_string().contains("Season"));
    }

    #[test]
    fn test_unknown_category() {
        let p = predictor();
        let err = p
            .predict(&fields(json!({"Crop": "Wheat", "Season": "Rabi"})))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_invalid_numeric() {
        let p = predictor();
        let err = p
            .predict(&fields(json!({"Crop": "Rice", "Season": "Rabi", "Area": "lots"})))
            .unwrap_err();
        match err {
            Error::InvalidNumeric { feature, .. } => assert_eq!(feature, "Area"),
            other => panic!("Expected InvalidNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_null_numeric_is_invalid() {
        let p = predictor();
        let err = p
            .predict(&fields(json!({"Crop": "Rice", "Season": "Rabi", "Rainfall": null})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidNumeric { .. }));
    }

    #[test]
    fn test_predict_value() {
        let p = predictor();
        // scaled: [1, 0, (120-100)/10 = 2, 4]
        let y = p
            .predict(&fields(json!({
                "Crop": "Rice", "Season": "Kharif", "Area": 120, "Rainfall": 4
            })))
            .unwrap();
        assert_eq!(y, 1000.0 + 100.0 + 0.0 + 2.0 + 2.0);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let p = predictor();
        let req = fields(json!({"Crop": "Maize", "Season": "Rabi", "Area": 90.5}));
        assert_eq!(p.predict(&req).unwrap(), p.predict(&req).unwrap());
    }

    #[test]
    fn test_model_width_mismatch_rejected() {
        let scaler = StandardScaler::new(vec!["Area".into()], vec![0.0], vec![1.0]).unwrap();
        let model = RegressionModel::Linear {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
        };
        let err = TabularPredictor::new(scaler, EncoderSet::default(), model).unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
    }

    #[test]
    fn test_orphan_encoder_rejected() {
        let scaler = StandardScaler::new(vec!["Area".into()], vec![0.0], vec![1.0]).unwrap();
        let mut classes = BTreeMap::new();
        classes.insert("State".to_string(), vec!["Assam".into()]);
        let encoders = EncoderSet::from_classes(classes).unwrap();
        let model = RegressionModel::Linear {
            coefficients: vec![1.0],
            intercept: 0.0,
        };
        assert!(TabularPredictor::new(scaler, encoders, model).is_err());
    }
}
