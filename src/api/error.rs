//! Response builder for failures
//!
//! Client mistakes (validation, unreadable body) answer 4xx; anything that
//! goes wrong inside inference answers 500 with the failure description.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::ErrorResponse;
use crate::{pipeline::InferenceError, validate::ValidationError};

/// Everything a prediction request can fail with
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed validation (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Scaling, classification or decoding failed (500)
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Body is not JSON, not sent as JSON, or not a JSON object
    #[error("{message}")]
    Body {
        /// Status chosen by the body extractor (400, 415, 413, ...)
        status: StatusCode,
        /// Explanation
        message: String,
    },
}

impl ApiError {
    /// Body parsed but is not a JSON object
    pub(crate) fn not_an_object() -> Self {
        ApiError::Body {
            status: StatusCode::BAD_REQUEST,
            message: "Request body must be a JSON object".to_string(),
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Body { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match &self {
            ApiError::Inference(e) => tracing::error!(error = ?e, "inference failed"),
            ApiError::Validation(e) => {
                tracing::debug!(field = %e.field(), reason = %message, "rejected prediction request");
            },
            ApiError::Body { .. } => tracing::debug!(%status, reason = %message, "unreadable request body"),
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
