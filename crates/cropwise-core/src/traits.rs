//! Trait seams between the advisory core and its external collaborators.

use async_trait::async_trait;

use crate::Result;

/// Backend for the external generative text service.
///
/// Implementations perform exactly one logical call per `generate` (a bounded
/// transport retry inside the call is allowed) and return the service's
/// response document untouched. Extracting the text payload is the caller's
/// concern, since different services nest it differently.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send a prompt and return the raw response document.
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
