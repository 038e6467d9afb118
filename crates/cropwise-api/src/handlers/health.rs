//! Health check handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let context = state.orchestrator.context();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "pest_labels": context.classifier().labels().len(),
        "yield_features": context.tabular().feature_names().len(),
        "advisor_model": state.orchestrator.advisor().model_name(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
