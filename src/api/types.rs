//! API Request/Response Types
//!
//! Every response body is one of three shapes: a liveness message, a
//! recommendation, or an error.

use serde::{Deserialize, Serialize};

/// Liveness response (`GET /`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Fixed liveness message
    pub message: String,
}

/// Successful prediction (`POST /predict`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Name of the recommended crop
    pub recommended_crop: String,
}

/// Error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
