//! Generative fertilizer and pesticide advisor.
//!
//! The advisor renders a fixed agronomist prompt from eight required fields,
//! sends it through a [`GenerationBackend`], and turns the reply into an
//! [`AdvisoryResult`]. Model output that is not valid JSON in the documented
//! shape never fails the request; it comes back as the degraded
//! `{error, rawText}` payload instead.

use std::sync::Arc;

use cropwise_core::fields::text_value;
use cropwise_core::{
    logging, Advisory, AdvisoryResult, Error, FieldMap, GenerationBackend, Result,
};
use tracing::{debug, instrument, warn, Span};

use crate::gemini::GenerateContentResponse;

/// Fields the prompt cannot be rendered without.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "crop_name",
    "temperature",
    "humidity",
    "moisture",
    "soil_type",
    "nitrogen",
    "phosphorus",
    "potassium",
];

const PROMPT_HEADER: &str = r#"You are an expert agronomist. Based on the given inputs, predict the most likely pest affecting the crop and recommend appropriate pesticides and fertilizers.
Please output your response as a JSON object in the following format:
{
  "predicted_pest": {
    "name": "<pest name>",
    "explanation": "<brief explanation>"
  },
  "pesticides": [
    {
      "name": "<pesticide name>",
      "description": "<short reason>",
      "dosage": "Apply as per manufacturer's instructions"
    }
    // up to 3 items
  ],
  "fertilizers": [
    {
      "name": "<fertilizer name>",
      "description": "<short reason>",
      "dosage": "Apply as per manufacturer's instructions"
    }
    // up to 3 items
  ]
}
"#;

/// Check that every required field is present.
pub fn validate_fields(fields: &FieldMap) -> Result<()> {
    match REQUIRED_FIELDS.iter().find(|f| !fields.contains_key(**f)) {
        Some(missing) => Err(Error::MissingField(missing.to_string())),
        None => Ok(()),
    }
}

/// Render the advisory prompt. Fields must already be validated.
pub fn render_prompt(fields: &FieldMap) -> String {
    let v = |name: &str| fields.get(name).map(text_value).unwrap_or_default();
    format!(
        "{header}
**Input Data:**
- **Crop Name:** {crop}
- **Environmental Factors:**
  - Temperature: {temperature}°C
  - Humidity: {humidity}%
  - Moisture: {moisture}%
  - Soil Type: {soil}
- **Soil Nutrient Levels:**
  - Nitrogen: {nitrogen}
  - Phosphorus: {phosphorus}
  - Potassium: {potassium}
",
        header = PROMPT_HEADER,
        crop = v("crop_name"),
        temperature = v("temperature"),
        humidity = v("humidity"),
        moisture = v("moisture"),
        soil = v("soil_type"),
        nitrogen = v("nitrogen"),
        phosphorus = v("phosphorus"),
        potassium = v("potassium"),
    )
}

/// Pull the text payload out of a response document.
///
/// Tried in order: candidate parts of a `generateContent` response, a
/// `content` string on an object, a bare string, and finally the document's
/// own JSON text.
pub fn extract_text(document: &serde_json::Value) -> String {
    if document.get("candidates").is_some() {
        if let Some(text) = serde_json::from_value::<GenerateContentResponse>(document.clone())
            .ok()
            .and_then(|r| r.first_text())
        {
            return text;
        }
    }
    if let Some(content) = document.get("content").and_then(|c| c.as_str()) {
        return content.to_string();
    }
    match document {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Remove a surrounding Markdown code fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest.trim();
    }
    if let Some(rest) = s.strip_prefix("```") {
        s = rest.trim();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim();
    }
    s
}

/// Parse cleaned model text into an advisory, degrading on failure.
pub fn parse_advisory(cleaned: &str) -> AdvisoryResult {
    let parsed = serde_json::from_str::<serde_json::Value>(cleaned)
        .and_then(serde_json::from_value::<Advisory>);
    match parsed {
        Ok(advisory) => AdvisoryResult::Parsed(advisory.truncated()),
        Err(e) => {
            warn!(
                subsystem = "inference",
                component = "advisor",
                error = %e,
                response_len = cleaned.len(),
                "Advisor response was not a valid advisory, returning raw text"
            );
            AdvisoryResult::degraded(cleaned)
        }
    }
}

/// Advisor bound to a generation backend.
#[derive(Clone)]
pub struct GenerativeAdvisor {
    backend: Arc<dyn GenerationBackend>,
}

impl GenerativeAdvisor {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Validate, prompt, and interpret one advisory request.
    ///
    /// Backend failures propagate; unparseable replies do not.
    #[instrument(
        skip(self, fields),
        fields(
            subsystem = "inference",
            component = "advisor",
            op = "advise",
            prompt_len = tracing::field::Empty,
            response_len = tracing::field::Empty
        )
    )]
    pub async fn advise(&self, fields: &FieldMap) -> Result<AdvisoryResult> {
        validate_fields(fields)?;
        let prompt = render_prompt(fields);
        let span = Span::current();
        span.record(logging::PROMPT_LEN, prompt.len());

        let document = self.backend.generate(&prompt).await?;
        let text = extract_text(&document);
        span.record(logging::RESPONSE_LEN, text.len());

        let result = parse_advisory(strip_code_fences(&text));
        debug!(degraded = result.is_degraded(), "Advisory produced");
        Ok(result)
    }
}
