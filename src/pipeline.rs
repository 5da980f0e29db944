use std::sync::Arc;

use thiserror::Error;

use crate::{artifacts::InferenceArtifacts, matrix::Matrix, validate::ValidatedVector};

/// Failure inside the scale -> classify -> decode sequence
///
/// These are internal faults (artifacts that do not fit together or do not
/// fit the input); `Display` is surfaced to callers as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// A matrix could not be formed
    #[error("Invalid shape: {reason}")]
    InvalidShape {
        /// What was wrong with the dimensions
        reason: String,
    },

    /// A stage received a different number of columns than it was fitted on
    #[error("X has {got} features, but {stage} is expecting {expected} features as input.")]
    FeatureCountMismatch {
        /// Stage that rejected the input
        stage: &'static str,
        /// Columns the stage was fitted on
        expected: usize,
        /// Columns received
        got: usize,
    },

    /// The scaled input holds NaN or infinity
    #[error("Input contains NaN, infinity or a value too large for {stage}.")]
    NonFiniteInput {
        /// Stage that rejected the input
        stage: &'static str,
    },

    /// An ensemble member scored a different number of classes than the
    /// ensemble declares
    #[error("Estimator produced {got} class scores, but the ensemble has {expected} classes")]
    ClassCountMismatch {
        /// Classes declared by the ensemble
        expected: usize,
        /// Scores produced by the member
        got: usize,
    },

    /// The classifier returned no class for the row
    #[error("Classifier returned no prediction")]
    EmptyPrediction,

    /// The classifier produced a class index the decoder does not know
    #[error("y contains previously unseen labels: [{index}]")]
    UnseenLabel {
        /// Class index produced by the classifier
        index: usize,
    },

    /// A decision tree references a node that does not exist
    #[error("Malformed decision tree: node {node} does not exist")]
    MalformedTree {
        /// Missing node index
        node: usize,
    },
}

/// Runs validated readings through the shared artifacts
///
/// Cheap to clone; every clone shares the same read-only artifacts.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use croprec::{artifacts::InferenceArtifacts, pipeline::InferencePipeline};
///
/// let pipeline = InferencePipeline::new(Arc::new(InferenceArtifacts::demo()));
/// let crop = pipeline
///     .predict_values(&[90.0, 42.0, 43.0, 21.5, 80.0, 6.5, 120.0])
///     .unwrap();
/// assert_eq!(crop, "maize");
/// ```
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    artifacts: Arc<InferenceArtifacts>,
}

impl InferencePipeline {
    /// Create a pipeline over loaded artifacts
    #[must_use]
    pub fn new(artifacts: Arc<InferenceArtifacts>) -> Self {
        Self { artifacts }
    }

    /// The artifacts this pipeline runs on
    #[must_use]
    pub fn artifacts(&self) -> &InferenceArtifacts {
        &self.artifacts
    }

    /// Recommend a crop for validated readings
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if any stage fails.
    pub fn predict(&self, vector: &ValidatedVector) -> Result<String, InferenceError> {
        self.predict_values(vector.values())
    }

    /// Recommend a crop for raw feature values in column order
    ///
    /// No range validation is applied.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] if any stage fails, including a column
    /// count the artifacts were not fitted on.
    pub fn predict_values(&self, values: &[f64]) -> Result<String, InferenceError> {
        let input = Matrix::row_vector(values.to_vec())?;
        let scaled = self.artifacts.scaler().transform(&input)?;
        let classes = self.artifacts.classifier().predict(&scaled)?;
        let index = *classes.first().ok_or(InferenceError::EmptyPrediction)?;
        let crop = self.artifacts.labels().decode(index)?;
        Ok(crop.to_string())
    }
}
