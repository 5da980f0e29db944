//! # Croprec
//!
//! Crop recommendation inference server.
//!
//! Croprec accepts seven agronomic readings (soil nitrogen, phosphorus and
//! potassium, air temperature, relative humidity, soil pH and rainfall),
//! validates them against physically plausible bounds, and runs them through
//! a pre-fitted scaler, an ensemble classifier and a label decoder to name the
//! crop best suited to those conditions.
//!
//! ## Example
//!
//! ```rust
//! use croprec::{artifacts::InferenceArtifacts, pipeline::InferencePipeline, validate};
//! use std::sync::Arc;
//!
//! let artifacts = Arc::new(InferenceArtifacts::demo());
//! let pipeline = InferencePipeline::new(artifacts);
//!
//! let body = serde_json::json!({
//!     "N": 90, "P": 42, "K": 43,
//!     "temperature": 21.5, "humidity": 80, "ph": 6.5, "rainfall": 120
//! });
//! let vector = validate::validate(body.as_object().unwrap()).unwrap();
//! let crop = pipeline.predict(&vector).unwrap();
//! assert!(!crop.is_empty());
//! ```
//!
//! ## Architecture
//!
//! Request flow is strictly linear:
//!
//! ```text
//! JSON body -> validate -> InferencePipeline (scale -> classify -> decode) -> response
//! ```
//!
//! - [`validate`]: presence, coercion and range checks, first failure wins
//! - [`artifacts`]: serialized scaler, ensemble classifier and label decoder
//! - [`pipeline`]: the deterministic transform-then-predict sequence
//! - `api`: axum router and the response contract (feature `server`)

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)] // Allow float comparisons in tests
#![allow(clippy::cast_precision_loss)] // usize -> f64 for averages is acceptable

#[cfg(feature = "server")]
pub mod api;
/// Serialized inference artifacts (scaler, ensemble classifier, label decoder)
///
/// Loaded once at startup, all-or-nothing, and shared read-only afterwards.
pub mod artifacts;
#[cfg(feature = "server")]
pub mod cli;
/// Rendering of numbers and JSON values inside user-facing error messages
pub mod display;
pub mod error;
/// The seven agronomic input fields and their validation rules
pub mod features;
pub mod matrix;
/// Scale -> classify -> decode
pub mod pipeline;
/// Input validation: presence, numeric coercion, range
pub mod validate;

// Re-exports for convenience
pub use error::{CropError, Result};
pub use matrix::Matrix;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
