//! Test helper functions for api tests

use super::*;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use tower::util::ServiceExt;

/// Create a test application with demo state
pub fn create_test_app() -> Router {
    create_router(AppState::demo())
}

/// The reference request body: every field valid
pub fn valid_body() -> serde_json::Map<String, Value> {
    serde_json::json!({
        "N": 90, "P": 42, "K": 43,
        "temperature": 21.5, "humidity": 80, "ph": 6.5, "rainfall": 120
    })
    .as_object()
    .cloned()
    .expect("test")
}

/// POST a JSON body to `/predict`
pub async fn post_predict(app: Router, body: &Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("test"),
    )
    .await
    .expect("test")
}

/// Read a response as `(status, json)`
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("test");
    let json = serde_json::from_slice(&body).expect("test");
    (status, json)
}
