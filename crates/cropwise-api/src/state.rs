//! Shared application state.

use std::sync::Arc;

use crate::services::Orchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Map feature-encoding failures to 400 instead of 500.
    pub strict_input_errors: bool,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, strict_input_errors: bool) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            strict_input_errors,
        }
    }
}
