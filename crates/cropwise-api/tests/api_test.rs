//! End-to-end tests for the HTTP API.
//!
//! Builds the full router over temporary artifacts, a fixed-output vision
//! model, and a mock generation backend, then drives it with `oneshot`.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cropwise_api::{build_router, AppState, Orchestrator, RouterOptions};
use cropwise_core::config::ArtifactPaths;
use cropwise_core::Result;
use cropwise_inference::mock::MockGenerationBackend;
use cropwise_inference::GenerativeAdvisor;
use cropwise_predict::{ImageTensor, ModelContext, PestModel};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "cropwise-test-boundary";

/// Vision model that always puts `confidence` on `index`.
struct FixedModel {
    index: usize,
    confidence: f32,
}

impl PestModel for FixedModel {
    fn output_width(&self) -> usize {
        132
    }

    fn infer(&self, _input: &ImageTensor) -> Result<Vec<f32>> {
        let rest = (1.0 - self.confidence) / 131.0;
        let mut probs = vec![rest; 132];
        probs[self.index] = self.confidence;
        Ok(probs)
    }
}

struct TestApp {
    router: Router,
    backend: MockGenerationBackend,
    dir: TempDir,
}

impl TestApp {
    fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    fn upload_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir()).unwrap().count()
    }
}

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn test_app(strict: bool, backend: MockGenerationBackend, confidence: f32) -> TestApp {
    build_app(strict, backend, confidence, 16 * 1024 * 1024)
}

fn build_app(
    strict: bool,
    backend: MockGenerationBackend,
    confidence: f32,
    max_upload_bytes: usize,
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let paths = ArtifactPaths {
        pest_model: root.join("unused.onnx"),
        pest_labels: None,
        pesticide_csv: write(
            root,
            "pesticides.csv",
            "Pest Name,Most Commonly Used Pesticides\n\
             aphids,\"imidacloprid, thiamethoxam, acetamiprid, malathion\"\n\
             thrips,spinosad\n",
        ),
        yield_model: write(
            root,
            "model.json",
            r#"{"kind": "linear", "coefficients": [100.0, 10.0, 2.0, 1.0], "intercept": 1000.0}"#,
        ),
        yield_scaler: write(
            root,
            "scaler.json",
            r#"{"feature_names": ["Crop", "Season", "Area", "Annual_Rainfall"],
                "mean": [0.0, 0.0, 50.0, 0.0], "scale": [1.0, 1.0, 10.0, 100.0]}"#,
        ),
        yield_encoders: write(
            root,
            "encoders.json",
            r#"{"Crop": ["Maize", "Rice"], "Season": ["Kharif", "Rabi"]}"#,
        ),
    };

    let model = Arc::new(FixedModel {
        index: 6,
        confidence,
    });
    let context = ModelContext::load_with_model(&paths, model).unwrap();
    let advisor = GenerativeAdvisor::new(Arc::new(backend.clone()));

    let upload_dir = root.join("uploads");
    std::fs::create_dir_all(&upload_dir).unwrap();

    let orchestrator = Orchestrator::new(context, advisor, upload_dir);
    let router = build_router(
        AppState::new(orchestrator, strict),
        &RouterOptions {
            allowed_origins: vec!["http://localhost:5173".to_string()],
            max_upload_bytes,
        },
    );

    TestApp {
        router,
        backend,
        dir,
    }
}

/// Router with the out-of-the-box error mapping (`STRICT_INPUT_ERRORS` unset).
fn default_app() -> TestApp {
    test_app(false, MockGenerationBackend::new(), 0.9)
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

fn multipart(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let body = multipart_body(field, filename, bytes);
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        40,
        40,
        image::Rgb([30, 160, 60]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn jpeg_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        40,
        40,
        image::Rgb([120, 90, 30]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

fn advisor_fields() -> Value {
    json!({
        "crop_name": "Rice",
        "temperature": 30,
        "humidity": 85,
        "moisture": 45,
        "soil_type": "Clayey",
        "nitrogen": 25,
        "phosphorus": 12,
        "potassium": 9
    })
}

// =============================================================================
// HEALTH
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = default_app();
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["pest_labels"], 132);
    assert_eq!(body["yield_features"], 4);
    assert_eq!(body["advisor_model"], "mock-gemini");
}

// =============================================================================
// IMAGE ANALYSIS
// =============================================================================

#[tokio::test]
async fn test_analyze_without_multipart_body() {
    let app = default_app();
    let request = Request::post("/api/analyze").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No image provided"}));
}

#[tokio::test]
async fn test_analyze_wrong_field_name() {
    let app = default_app();
    let (status, body) = send(&app, multipart("photo", "leaf.png", &png_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_analyze_empty_filename() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "", &png_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No selected file");
}

#[tokio::test]
async fn test_analyze_disallowed_extension() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "leaf.gif", &png_bytes())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file type");
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_analyze_success() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "leaf.PNG", &png_bytes())).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    assert_eq!(body["pestName"], "aphids");
    assert_eq!(body["severity"], "high");
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((confidence - 0.9).abs() < 1e-6);

    let pesticides = body["recommendations"]["pesticides"].as_array().unwrap();
    let names: Vec<_> = pesticides.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["imidacloprid", "thiamethoxam", "acetamiprid"]);
    assert_eq!(
        pesticides[0]["description"],
        "Recommended pesticide for the detected pest."
    );
    assert_eq!(body["recommendations"]["fertilizers"], json!([]));

    assert_eq!(app.upload_count(), 0, "upload must be removed after the request");
}

#[tokio::test]
async fn test_analyze_medium_severity() {
    let app = test_app(false, MockGenerationBackend::new(), 0.6);
    let (status, body) = send(&app, multipart("image", "leaf.png", &png_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["severity"], "medium");
}

#[tokio::test]
async fn test_analyze_png_named_jpg() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "leaf.jpg", &png_bytes())).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["pestName"], "aphids");
    assert_eq!(app.upload_count(), 0);
}

#[tokio::test]
async fn test_analyze_jpeg_named_png() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "leaf.png", &jpeg_bytes())).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["severity"], "high");
}

#[tokio::test]
async fn test_analyze_undecodable_image() {
    let app = default_app();
    let (status, body) = send(&app, multipart("image", "leaf.png", b"not an image")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("decode"));
    assert_eq!(app.upload_count(), 0, "upload must be removed on failure too");
}

#[tokio::test]
async fn test_analyze_oversized_upload_is_json() {
    let app = build_app(false, MockGenerationBackend::new(), 0.9, 64);
    let body = multipart_body("image", "leaf.png", &png_bytes());
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"error": "Request body too large"}));
    assert_eq!(app.upload_count(), 0);
}

// =============================================================================
// YIELD PREDICTION
// =============================================================================

#[tokio::test]
async fn test_yield_empty_object() {
    let app = default_app();
    let (status, body) = send(&app, post_json("/api/predict-yield", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No data provided"}));
}

#[tokio::test]
async fn test_yield_absent_body() {
    let app = default_app();
    let (status, body) = send(&app, post_json("/api/predict-yield", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");
}

#[tokio::test]
async fn test_yield_success() {
    let app = default_app();
    let request = post_json(
        "/api/predict-yield",
        json!({"Crop": "Rice", "Season": "Rabi", "Area": 70, "Annual_Rainfall": 300, "State": "Assam"})
            .to_string(),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    // scaled: [1, 1, 2, 3] -> 1000 + 100 + 10 + 4 + 3
    assert_eq!(body["prediction"].as_f64().unwrap(), 1117.0);
    assert_eq!(body["unit"], "kg per hectare");
}

#[tokio::test]
async fn test_yield_missing_categorical() {
    let app = default_app();
    let request = post_json("/api/predict-yield", json!({"Crop": "Rice", "Area": 10}).to_string());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing required categorical feature: Season");
}

#[tokio::test]
async fn test_yield_missing_categorical_strict() {
    let app = test_app(true, MockGenerationBackend::new(), 0.9);
    let request = post_json("/api/predict-yield", json!({"Crop": "Rice", "Area": 10}).to_string());
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required categorical feature: Season");
}

#[tokio::test]
async fn test_yield_unknown_category() {
    let app = default_app();
    let request = post_json(
        "/api/predict-yield",
        json!({"Crop": "Wheat", "Season": "Rabi"}).to_string(),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Invalid value for Crop: Wheat");
}

#[tokio::test]
async fn test_yield_invalid_numeric_strict() {
    let app = test_app(true, MockGenerationBackend::new(), 0.9);
    let request = post_json(
        "/api/predict-yield",
        json!({"Crop": "Rice", "Season": "Rabi", "Area": "large"}).to_string(),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Area"));
}

#[tokio::test]
async fn test_yield_oversized_body_is_json() {
    let app = build_app(false, MockGenerationBackend::new(), 0.9, 16);
    let body = json!({"Crop": "Rice", "Season": "Rabi", "Area": 70}).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict-yield")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request body too large");
}

// =============================================================================
// FERTILIZER ADVISORY
// =============================================================================

#[tokio::test]
async fn test_fertilizer_success_truncates() {
    let reply = json!({
        "predicted_pest": {"name": "brown plant hopper", "explanation": "high humidity"},
        "pesticides": [
            {"name": "p1", "description": "a", "dosage": "Apply as per manufacturer's instructions"},
            {"name": "p2", "description": "b", "dosage": "Apply as per manufacturer's instructions"},
            {"name": "p3", "description": "c", "dosage": "Apply as per manufacturer's instructions"},
            {"name": "p4", "description": "d", "dosage": "Apply as per manufacturer's instructions"}
        ],
        "fertilizers": [
            {"name": "urea", "description": "nitrogen", "dosage": "Apply as per manufacturer's instructions"},
            {"name": "DAP", "description": "phosphorus", "dosage": "Apply as per manufacturer's instructions"}
        ]
    });
    let backend = MockGenerationBackend::new().with_text_response(format!("```json\n{}\n```", reply));
    let app = test_app(true, backend, 0.9);

    let (status, body) = send(
        &app,
        post_json("/api/recommend-fertilizer", advisor_fields().to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);

    let recs = &body["recommendations"];
    assert_eq!(recs["predicted_pest"]["name"], "brown plant hopper");
    assert_eq!(recs["pesticides"].as_array().unwrap().len(), 3);
    assert_eq!(recs["fertilizers"].as_array().unwrap().len(), 2);
    assert_eq!(app.backend.call_count(), 1);
    assert!(app.backend.prompts()[0].contains("Temperature: 30°C"));
}

#[tokio::test]
async fn test_fertilizer_degraded_reply() {
    let backend = MockGenerationBackend::new().with_text_response("Sorry, I can't do that.");
    let app = test_app(true, backend, 0.9);

    let (status, body) = send(
        &app,
        post_json("/api/recommend-fertilizer", advisor_fields().to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["recommendations"],
        json!({"error": "Failed to parse response", "rawText": "Sorry, I can't do that."})
    );
}

#[tokio::test]
async fn test_fertilizer_missing_field() {
    let app = default_app();
    let mut fields = advisor_fields();
    fields.as_object_mut().unwrap().remove("nitrogen");

    let (status, body) = send(
        &app,
        post_json("/api/recommend-fertilizer", fields.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: nitrogen");
    assert_eq!(app.backend.call_count(), 0);
}

#[tokio::test]
async fn test_fertilizer_empty_body() {
    let app = default_app();
    let (status, body) = send(&app, post_json("/api/recommend-fertilizer", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");
}

#[tokio::test]
async fn test_fertilizer_service_failure() {
    let backend = MockGenerationBackend::new().with_failure("connection refused");
    let app = test_app(true, backend, 0.9);

    let (status, body) = send(
        &app,
        post_json("/api/recommend-fertilizer", advisor_fields().to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}
