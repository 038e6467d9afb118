//! Result contracts returned by the advisory pipelines.

use serde::{Deserialize, Deserializer, Serialize};

use crate::defaults::{
    MAX_REMEDIES, PARSE_FAILURE_MESSAGE, SEVERITY_HIGH_THRESHOLD, SEVERITY_MEDIUM_THRESHOLD,
    YIELD_UNIT,
};

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Output of the pest image classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Label from the model vocabulary, or the "Unknown Pest" sentinel.
    pub label: String,
    /// Probability of the arg-max class, in [0, 1].
    pub confidence: f64,
}

/// Coarse display bucket derived from classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Step function over confidence. Boundaries fall to the lower tier.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > SEVERITY_HIGH_THRESHOLD {
            Severity::High
        } else if confidence > SEVERITY_MEDIUM_THRESHOLD {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

/// Read an explicit JSON `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single pesticide or fertilizer suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemedyEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
}

impl RemedyEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            dosage: None,
        }
    }
}

/// Pest predicted by the generative advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

/// Typed advisory produced from the generative service's JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_pest: Option<PredictedPest>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pesticides: Vec<RemedyEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fertilizers: Vec<RemedyEntry>,
}

impl Advisory {
    /// Enforce the per-category bound, keeping the first entries.
    pub fn truncated(mut self) -> Self {
        self.pesticides.truncate(MAX_REMEDIES);
        self.fertilizers.truncate(MAX_REMEDIES);
        self
    }
}

/// Fallback carried back to the caller when the advisor text is not valid JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradedAdvisory {
    pub error: String,
    #[serde(rename = "rawText")]
    pub raw_text: String,
}

/// Outcome of the generative advisory path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdvisoryResult {
    Parsed(Advisory),
    Degraded(DegradedAdvisory),
}

impl AdvisoryResult {
    pub fn degraded(raw_text: impl Into<String>) -> Self {
        AdvisoryResult::Degraded(DegradedAdvisory {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            raw_text: raw_text.into(),
        })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AdvisoryResult::Degraded(_))
    }
}

// =============================================================================
// ENDPOINT RESPONSES
// =============================================================================

/// Pesticide and fertilizer lists attached to an image analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendations {
    pub pesticides: Vec<RemedyEntry>,
    pub fertilizers: Vec<RemedyEntry>,
}

/// Response of the image analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub pest_name: String,
    pub confidence: f64,
    pub severity: Severity,
    pub recommendations: Recommendations,
}

/// Response of the yield prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldResponse {
    pub prediction: f64,
    pub unit: String,
}

impl YieldResponse {
    pub fn new(prediction: f64) -> Self {
        Self {
            prediction,
            unit: YIELD_UNIT.to_string(),
        }
    }
}

/// Response of the fertilizer recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerResponse {
    pub recommendations: AdvisoryResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_confidence(0.80), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.8000001), Severity::High);
        assert_eq!(Severity::from_confidence(0.50), Severity::Low);
        assert_eq!(Severity::from_confidence(0.5000001), Severity::Medium);
        assert_eq!(Severity::from_confidence(0.99), Severity::High);
        assert_eq!(Severity::from_confidence(0.0), Severity::Low);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Severity::High).unwrap(), json!("high"));
        assert_eq!(Severity::Medium.to_string(), "medium");
    }

    #[test]
    fn test_analysis_response_shape() {
        let response = AnalysisResponse {
            pest_name: "aphids".to_string(),
            confidence: 0.9,
            severity: Severity::High,
            recommendations: Recommendations {
                pesticides: vec![RemedyEntry::new("imidacloprid", "d")],
                fertilizers: vec![],
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["pestName"], "aphids");
        assert_eq!(value["severity"], "high");
        assert_eq!(value["recommendations"]["pesticides"][0]["name"], "imidacloprid");
        assert!(value["recommendations"]["pesticides"][0].get("dosage").is_none());
        assert_eq!(value["recommendations"]["fertilizers"], json!([]));
    }

    #[test]
    fn test_yield_response_unit() {
        let value = serde_json::to_value(YieldResponse::new(1234.5)).unwrap();
        assert_eq!(value, json!({"prediction": 1234.5, "unit": "kg per hectare"}));
    }

    #[test]
    fn test_advisory_truncated() {
        let entries: Vec<RemedyEntry> = (0..5)
            .map(|i| RemedyEntry::new(format!("p{}", i), ""))
            .collect();
        let advisory = Advisory {
            predicted_pest: None,
            pesticides: entries.clone(),
            fertilizers: entries,
        }
        .truncated();
        assert_eq!(advisory.pesticides.len(), 3);
        assert_eq!(advisory.fertilizers.len(), 3);
        assert_eq!(advisory.pesticides[2].name, "p2");
    }

    #[test]
    fn test_degraded_serialization() {
        let value = serde_json::to_value(AdvisoryResult::degraded("not json")).unwrap();
        assert_eq!(
            value,
            json!({"error": "Failed to parse response", "rawText": "not json"})
        );
    }

    #[test]
    fn test_advisory_nulls_read_as_defaults() {
        let advisory: Advisory = serde_json::from_value(json!({
            "predicted_pest": {"name": null, "explanation": null},
            "pesticides": null,
            "fertilizers": [{"name": "DAP", "description": null}]
        }))
        .unwrap();
        let pest = advisory.predicted_pest.unwrap();
        assert_eq!(pest.name, "");
        assert_eq!(pest.explanation, "");
        assert!(advisory.pesticides.is_empty());
        assert_eq!(advisory.fertilizers[0], RemedyEntry::new("DAP", ""));
    }

    #[test]
    fn test_advisory_missing_fields_default() {
        let advisory: Advisory = serde_json::from_value(json!({})).unwrap();
        assert_eq!(advisory, Advisory::default());
    }

    #[test]
    fn test_parsed_serialization_is_transparent() {
        let advisory: Advisory = serde_json::from_value(json!({
            "predicted_pest": {"name": "stem borer", "explanation": "humid"},
            "pesticides": [{"name": "chlorantraniliprole", "description": "x", "dosage": "10 ml"}],
            "fertilizers": []
        }))
        .unwrap();
        let value = serde_json::to_value(AdvisoryResult::Parsed(advisory)).unwrap();
        assert_eq!(value["predicted_pest"]["name"], "stem borer");
        assert_eq!(value["pesticides"][0]["dosage"], "10 ml");
        assert!(value.get("error").is_none());
    }
}
