//! Inference artifacts
//!
//! Three JSON documents in one model directory:
//!
//! - `scaler.json` - fitted [`Scaler`]
//! - `ensemble_model.json` - fitted [`EnsembleClassifier`]
//! - `label_encoder.json` - fitted [`LabelDecoder`]
//!
//! Loading is all-or-nothing. Each artifact is checked on its own at load
//! time; mismatches *between* artifacts (scaler width vs classifier width,
//! decoder size vs classifier classes) only produce warnings here and surface
//! per request as inference failures.
//!
//! ## Example
//!
//! ```rust,ignore
//! use croprec::artifacts::InferenceArtifacts;
//!
//! // Logs a warning for each entry of `compatibility_warnings()`
//! let artifacts = InferenceArtifacts::load("model")?;
//! ```

mod demo;
mod ensemble;
mod labels;
mod scaler;
mod tree;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use ensemble::{EnsembleClassifier, Estimator, LogisticModel, Voting, WeightedEstimator};
pub use labels::LabelDecoder;
pub use scaler::Scaler;
pub use tree::{DecisionTree, TreeNode};

use crate::features::FEATURE_COUNT;

/// File name of the fitted scaler
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the fitted classifier
pub const CLASSIFIER_FILE: &str = "ensemble_model.json";
/// File name of the label decoder
pub const LABELS_FILE: &str = "label_encoder.json";

/// Artifact loading errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The file could not be read
    #[error("Failed to read {file}: {reason}")]
    Io {
        /// Path of the artifact
        file: String,
        /// I/O error message
        reason: String,
    },

    /// The file is not a valid artifact document
    #[error("Failed to parse {file}: {reason}")]
    Parse {
        /// Path of the artifact
        file: String,
        /// Deserializer message
        reason: String,
    },

    /// The document parsed but its parameters are unusable
    #[error("Invalid artifact {file}: {reason}")]
    Invalid {
        /// Path or name of the artifact
        file: String,
        /// Which invariant failed
        reason: String,
    },
}

/// Scaler, classifier and label decoder, loaded once and shared read-only
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceArtifacts {
    scaler: Scaler,
    classifier: EnsembleClassifier,
    labels: LabelDecoder,
}

impl InferenceArtifacts {
    /// Assemble artifacts from already-fitted parts
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] if any part fails its own checks.
    pub fn from_parts(
        scaler: Scaler,
        classifier: EnsembleClassifier,
        labels: LabelDecoder,
    ) -> Result<Self, ArtifactError> {
        let invalid = |file: &str| {
            let file = file.to_string();
            move |reason| ArtifactError::Invalid { file, reason }
        };
        scaler.check().map_err(invalid(SCALER_FILE))?;
        classifier.check().map_err(invalid(CLASSIFIER_FILE))?;
        labels.check().map_err(invalid(LABELS_FILE))?;

        Ok(Self {
            scaler,
            classifier,
            labels,
        })
    }

    /// Load all three artifacts from `dir`
    ///
    /// Files are read in the order scaler, classifier, label decoder; the
    /// first failure aborts the load. Mismatches between the artifacts are
    /// logged as warnings and do not fail the load.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] naming the artifact that could not be read,
    /// parsed or checked.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();

        let scaler: Scaler = read_artifact(&dir.join(SCALER_FILE))?;
        check_artifact(&dir.join(SCALER_FILE), scaler.check())?;

        let classifier: EnsembleClassifier = read_artifact(&dir.join(CLASSIFIER_FILE))?;
        check_artifact(&dir.join(CLASSIFIER_FILE), classifier.check())?;

        let labels: LabelDecoder = read_artifact(&dir.join(LABELS_FILE))?;
        check_artifact(&dir.join(LABELS_FILE), labels.check())?;

        tracing::info!(
            dir = %dir.display(),
            scaler = scaler.name(),
            estimators = classifier.estimators.len(),
            classes = labels.len(),
            "loaded inference artifacts"
        );

        let artifacts = Self {
            scaler,
            classifier,
            labels,
        };
        for warning in artifacts.compatibility_warnings() {
            tracing::warn!(%warning, "artifact mismatch, predictions will fail");
        }
        Ok(artifacts)
    }

    /// Write the artifacts to `dir` in the format [`Self::load`] reads
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] if the directory or a file cannot be
    /// written.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ArtifactError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| ArtifactError::Io {
            file: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let written = vec![
            write_artifact(&dir.join(SCALER_FILE), &self.scaler)?,
            write_artifact(&dir.join(CLASSIFIER_FILE), &self.classifier)?,
            write_artifact(&dir.join(LABELS_FILE), &self.labels)?,
        ];
        Ok(written)
    }

    /// Cross-artifact shape problems that will make every prediction fail
    #[must_use]
    pub fn compatibility_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.scaler.n_features() != FEATURE_COUNT {
            warnings.push(format!(
                "{} expects {} features, requests carry {FEATURE_COUNT}",
                self.scaler.name(),
                self.scaler.n_features()
            ));
        }
        if self.classifier.n_features != self.scaler.n_features() {
            warnings.push(format!(
                "classifier expects {} features, {} produces {}",
                self.classifier.n_features,
                self.scaler.name(),
                self.scaler.n_features()
            ));
        }
        if self.labels.len() < self.classifier.n_classes {
            warnings.push(format!(
                "classifier predicts {} classes, label decoder knows {}",
                self.classifier.n_classes,
                self.labels.len()
            ));
        }
        warnings
    }

    /// Fitted scaler
    #[must_use]
    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Fitted classifier
    #[must_use]
    pub fn classifier(&self) -> &EnsembleClassifier {
        &self.classifier
    }

    /// Label decoder
    #[must_use]
    pub fn labels(&self) -> &LabelDecoder {
        &self.labels
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| ArtifactError::Io {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Parse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn check_artifact(path: &Path, checked: Result<(), String>) -> Result<(), ArtifactError> {
    checked.map_err(|reason| ArtifactError::Invalid {
        file: path.display().to_string(),
        reason,
    })
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, ArtifactError> {
    let io_error = |reason: String| ArtifactError::Io {
        file: path.display().to_string(),
        reason,
    };
    let json = serde_json::to_vec_pretty(value).map_err(|e| io_error(e.to_string()))?;
    fs::write(path, json).map_err(|e| io_error(e.to_string()))?;
    Ok(path.to_path_buf())
}
