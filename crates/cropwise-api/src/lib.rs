//! cropwise-api - HTTP API server for cropwise
//!
//! Routes:
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/api/analyze` | pest image analysis |
//! | POST | `/api/predict-yield` | crop yield prediction |
//! | POST | `/api/recommend-fertilizer` | generative advisory |
//! | GET | `/health` | health check |

pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

pub use error::ApiError;
pub use services::Orchestrator;
pub use state::AppState;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// HTTP-layer settings applied around the routes.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl RouterOptions {
    pub fn from_config(config: &cropwise_core::AppConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

fn parse_allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

pub const PAYLOAD_TOO_LARGE: &str = "Request body too large";

/// Replace plain-text 413 rejections from the body limit with the JSON error shape.
async fn json_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return ApiError::PayloadTooLarge(PAYLOAD_TOO_LARGE.to_string()).into_response();
    }
    response
}

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/analyze", post(handlers::analyze::analyze_image))
        .route("/api/predict-yield", post(handlers::yield_prediction::predict_yield))
        .route(
            "/api/recommend-fertilizer",
            post(handlers::advisory::recommend_fertilizer),
        )
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parse_allowed_origins(
                    &options.allowed_origins,
                )))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .max_age(std::time::Duration::from_secs(3600)),
        )
        // The upload limit replaces axum's default 2 MB extractor limit.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(options.max_upload_bytes))
        .layer(axum::middleware::map_response(json_payload_too_large))
        .with_state(state)
}
