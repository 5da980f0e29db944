//! End-to-end tests: artifacts on disk -> router -> JSON responses

#![cfg(feature = "server")]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use croprec::{
    api::{create_router, AppState},
    artifacts::{InferenceArtifacts, CLASSIFIER_FILE, LABELS_FILE, SCALER_FILE},
    CropError,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn predict(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("test"),
        )
        .await
        .expect("test");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    (status, serde_json::from_slice(&bytes).expect("test"))
}

fn loaded_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("test");
    InferenceArtifacts::demo().export(dir.path()).expect("test");
    let artifacts = InferenceArtifacts::load(dir.path()).expect("test");
    (dir, create_router(AppState::new(artifacts)))
}

#[tokio::test]
async fn test_reference_scenarios_from_disk() {
    let (_dir, app) = loaded_app();

    let cases = [
        (
            json!({"N": 90, "P": 42, "K": 43, "temperature": 21.5, "humidity": 80, "ph": 6.5, "rainfall": 120}),
            "maize",
        ),
        (
            json!({"N": 80, "P": 40, "K": 40, "temperature": 24, "humidity": 92, "ph": 6.5, "rainfall": 240}),
            "rice",
        ),
        (
            json!({"N": 30, "P": 70, "K": 80, "temperature": 18, "humidity": 16, "ph": 7.5, "rainfall": 80}),
            "chickpea",
        ),
    ];

    for (body, crop) in cases {
        let (status, parsed) = predict(app.clone(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parsed, json!({"recommended_crop": crop}));
    }
}

#[tokio::test]
async fn test_string_inputs_and_extra_keys() {
    let (_dir, app) = loaded_app();
    let body = json!({
        "N": "90", "P": " 42 ", "K": 43.0,
        "temperature": "21.5", "humidity": 80, "ph": "6.5", "rainfall": 120,
        "farm": "north field"
    });

    let (status, parsed) = predict(app, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parsed["recommended_crop"], "maize");
}

#[tokio::test]
async fn test_error_messages_end_to_end() {
    let (_dir, app) = loaded_app();

    let (status, parsed) = predict(app.clone(), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "Missing input value: N");

    let (status, parsed) = predict(
        app.clone(),
        json!({"N": 90, "P": 42, "K": 43, "temperature": null, "humidity": 80, "ph": 6.5, "rainfall": 120}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parsed["error"],
        "Invalid data type for Temperature. Expected a numeric value, but received: 'None'"
    );

    let (status, parsed) = predict(
        app,
        json!({"N": 90, "P": 42, "K": 43, "temperature": 21.5, "humidity": 80, "ph": 10, "rainfall": 120}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parsed["error"],
        "pH is out of acceptable range. Value must be between 3.5 and 9.9. You provided: 10.0"
    );
}

#[test]
fn test_load_reports_first_broken_file() {
    let dir = tempfile::tempdir().expect("test");
    InferenceArtifacts::demo().export(dir.path()).expect("test");
    std::fs::write(dir.path().join(CLASSIFIER_FILE), "{ not json").expect("test");
    std::fs::remove_file(dir.path().join(LABELS_FILE)).expect("test");

    let err = CropError::from(InferenceArtifacts::load(dir.path()).unwrap_err());
    let message = err.to_string();
    assert!(message.contains(CLASSIFIER_FILE), "{message}");
    assert!(!message.contains(SCALER_FILE), "{message}");
}
