//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cropwise_inference::mock::MockGenerationBackend;
//!
//! let backend = MockGenerationBackend::new().with_text_response(r#"{"pesticides": []}"#);
//! let document = backend.generate("prompt").await.unwrap();
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cropwise_core::{Error, GenerationBackend, Result};
use serde_json::json;

#[derive(Debug, Clone)]
enum MockReply {
    Document(serde_json::Value),
    Failure(String),
}

/// Mock generation backend that records prompts and replies with a fixed
/// document.
#[derive(Clone)]
pub struct MockGenerationBackend {
    reply: MockReply,
    model: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerationBackend {
    /// Create a mock that replies with an empty advisory.
    pub fn new() -> Self {
        Self {
            reply: MockReply::Document(candidate_document(
                r#"{"pesticides": [], "fertilizers": []}"#,
            )),
            model: "mock-gemini".to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with a `generateContent` document whose candidate text is `text`.
    pub fn with_text_response(mut self, text: impl AsRef<str>) -> Self {
        self.reply = MockReply::Document(candidate_document(text.as_ref()));
        self
    }

    /// Reply with an arbitrary document.
    pub fn with_document(mut self, document: serde_json::Value) -> Self {
        self.reply = MockReply::Document(document);
        self
    }

    /// Fail every call with an external service error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.reply = MockReply::Failure(message.into());
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

fn candidate_document(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.reply {
            MockReply::Document(doc) => Ok(doc.clone()),
            MockReply::Failure(msg) => Err(Error::ExternalService(msg.clone())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
