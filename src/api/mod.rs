//! HTTP API for crop recommendation
//!
//! ## Endpoints
//!
//! - `GET /` - Liveness probe
//! - `POST /predict` - Recommend a crop for seven agronomic readings
//!
//! ## Example
//!
//! ```rust,ignore
//! use croprec::api::{create_router, AppState};
//!
//! let state = AppState::new(artifacts);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

mod error;
mod types;

#[cfg(test)]
mod test_helpers;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use error::ApiError;
pub use types::{ErrorResponse, PredictResponse, StatusResponse};

use crate::{artifacts::InferenceArtifacts, pipeline::InferencePipeline, validate::validate};

/// Liveness message returned by `GET /`
pub const STATUS_MESSAGE: &str = "Crop Recommendation API is running.";

/// Browser origins allowed by default (local frontend dev servers)
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:5174"];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline over the read-only artifacts
    pipeline: InferencePipeline,
    /// Origins allowed to call the API from a browser
    allowed_origins: Arc<[HeaderValue]>,
}

impl AppState {
    /// Create application state over loaded artifacts with the default
    /// allowed origins
    #[must_use]
    pub fn new(artifacts: InferenceArtifacts) -> Self {
        let allowed_origins = DEFAULT_ALLOWED_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect();
        Self {
            pipeline: InferencePipeline::new(Arc::new(artifacts)),
            allowed_origins,
        }
    }

    /// Create application state with the built-in demo artifacts
    #[must_use]
    pub fn demo() -> Self {
        Self::new(InferenceArtifacts::demo())
    }

    /// Replace the allowed browser origins
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<HeaderValue>) -> Self {
        self.allowed_origins = origins.into();
        self
    }

    /// The inference pipeline
    #[must_use]
    pub fn pipeline(&self) -> &InferencePipeline {
        &self.pipeline
    }

    /// Allowed browser origins
    #[must_use]
    pub fn allowed_origins(&self) -> &[HeaderValue] {
        &self.allowed_origins
    }

    fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed_origins.iter().cloned()))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let cors = state.cors_layer();
    Router::new()
        .route("/", get(index_handler))
        .route("/predict", post(predict_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness handler (`GET /`)
async fn index_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

/// Prediction handler (`POST /predict`)
///
/// Validates the body, runs inference and builds exactly one of: 200 with
/// the crop, 400 with the first validation failure, 500 with the inference
/// failure.
async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(body) = payload?;
    let fields = body.as_object().ok_or_else(ApiError::not_an_object)?;

    let vector = validate(fields)?;

    let start = Instant::now();
    let crop = state.pipeline.predict(&vector)?;
    tracing::debug!(
        crop = %crop,
        latency_us = saturating_micros(start.elapsed()),
        "prediction"
    );

    Ok(Json(PredictResponse {
        recommended_crop: crop,
    }))
}

/// Whole microseconds in `elapsed`, saturating at `u64::MAX`
fn saturating_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}
