//! Error types for croprec
//!
//! Request-level failures have their own types ([`crate::validate::ValidationError`],
//! [`crate::pipeline::InferenceError`]) because they map to HTTP responses.
//! [`CropError`] covers everything that can stop the process: artifact loading,
//! configuration and the server itself.

use thiserror::Error;

use crate::artifacts::ArtifactError;

/// Result type alias for croprec operations
pub type Result<T> = std::result::Result<T, CropError>;

/// Process-level error type
#[derive(Debug, Error)]
pub enum CropError {
    /// One of the inference artifacts could not be loaded
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Host/port combination does not form a socket address
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress {
        /// The address that failed to parse
        address: String,
        /// Parser message
        reason: String,
    },

    /// An allowed CORS origin is not a valid header value
    #[error("Invalid allowed origin '{0}'")]
    InvalidOrigin(String),

    /// Binding or serving failed
    #[error("Server error during {operation}: {reason}")]
    Server {
        /// Operation that failed (bind, serve)
        operation: String,
        /// Underlying I/O message
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_address_display() {
        let err = CropError::InvalidAddress {
            address: "nohost:99999".to_string(),
            reason: "invalid port value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid address 'nohost:99999': invalid port value"
        );
    }

    #[test]
    fn test_artifact_error_is_transparent() {
        let inner = ArtifactError::Invalid {
            file: "scaler.json".to_string(),
            reason: "empty mean".to_string(),
        };
        let expected = inner.to_string();
        let err: CropError = inner.into();
        assert_eq!(err.to_string(), expected);
    }
}
