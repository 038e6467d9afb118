//! Gemini `generateContent` backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn, Span};

use cropwise_core::config::AdvisorSettings;
use cropwise_core::defaults::{
    GEMINI_BASE_URL, GEMINI_MAX_RETRIES, GEMINI_MODEL, GEMINI_RETRY_DELAY_MS, GEMINI_TEMPERATURE,
    GEMINI_TIMEOUT_SECS, SLOW_GENERATION_MS,
};
use cropwise_core::{logging, Error, GenerationBackend, Result};

use super::error::{to_cropwise_error, GeminiErrorCode};
use super::types::{GeminiErrorResponse, GenerateContentRequest};

/// Configuration for the Gemini backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API root, e.g. `https://generativelanguage.googleapis.com/v1beta`.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Extra attempts after a retryable failure.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: GEMINI_MODEL.to_string(),
            temperature: GEMINI_TEMPERATURE,
            timeout_seconds: GEMINI_TIMEOUT_SECS,
            max_retries: GEMINI_MAX_RETRIES,
            retry_delay_ms: GEMINI_RETRY_DELAY_MS,
        }
    }
}

impl From<&AdvisorSettings> for GeminiConfig {
    fn from(settings: &AdvisorSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            timeout_seconds: settings.timeout_secs,
            max_retries: settings.max_retries,
            retry_delay_ms: GEMINI_RETRY_DELAY_MS,
        }
    }
}

/// A failed attempt and whether another one may help.
struct AttemptError {
    error: Error,
    retryable: bool,
}

/// Gemini generative backend.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "gemini",
            url = %config.base_url,
            model = %config.model,
            timeout_secs = config.timeout_seconds,
            max_retries = config.max_retries,
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn send_once(
        &self,
        request: &GenerateContentRequest,
    ) -> std::result::Result<serde_json::Value, AttemptError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError {
                error: Error::ExternalService(format!("Request failed: {}", e)),
                retryable: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&body)
            {
                Ok(envelope) => (envelope.error.status, envelope.error.message),
                Err(_) => (String::new(), format!("HTTP {}", status)),
            };
            let code = GeminiErrorCode::from_response(status.as_u16(), &error_status);
            return Err(AttemptError {
                error: to_cropwise_error(code, &message),
                retryable: code.is_retryable(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AttemptError {
                error: Error::ExternalService(format!("Invalid response body: {}", e)),
                retryable: false,
            })
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(
        skip(self, prompt),
        fields(
            subsystem = "inference",
            component = "gemini",
            op = "generate",
            model = %self.config.model,
            prompt_len = prompt.len(),
            attempt = tracing::field::Empty,
            success = tracing::field::Empty
        )
    )]
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value> {
        let request = GenerateContentRequest::user_prompt(prompt, self.config.temperature);
        let start = Instant::now();
        let mut attempt: u32 = 0;

        let span = Span::current();
        loop {
            attempt += 1;
            span.record(logging::ATTEMPT, attempt);
            match self.send_once(&request).await {
                Ok(document) => {
                    span.record(logging::SUCCESS, true);
                    let duration_ms = start.elapsed().as_millis() as u64;
                    if duration_ms > SLOW_GENERATION_MS {
                        warn!(duration_ms, attempt, slow = true, "Slow Gemini generation");
                    }
                    debug!(duration_ms, attempt, "Gemini generation complete");
                    return Ok(document);
                }
                Err(failure) if failure.retryable && attempt <= self.config.max_retries => {
                    warn!(attempt, error = %failure.error, "Gemini call failed, retrying");
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(failure) => {
                    span.record(logging::SUCCESS, false);
                    warn!(
                        attempt,
                        duration_ms = start.elapsed().as_millis() as u64,
                        error = %failure.error,
                        "Gemini call failed"
                    );
                    return Err(failure.error);
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
