//! Fitted feature scalers
//!
//! Parameters follow the fitted-transformer layout: one entry per input
//! column, learned at training time and applied unchanged at inference.

use serde::{Deserialize, Serialize};

use crate::{matrix::Matrix, pipeline::InferenceError};

/// A fitted scaler
///
/// Serialized with a `kind` tag:
///
/// ```json
/// {"kind": "standard", "mean": [50.5, 53.4], "scale": [36.9, 33.0]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// Z-score normalization: `z = (x - mean) / scale`
    Standard {
        /// Per-column mean
        mean: Vec<f64>,
        /// Per-column standard deviation; zero is treated as one
        scale: Vec<f64>,
    },
    /// Range normalization: `z = x * scale + min`
    MinMax {
        /// Per-column offset applied after scaling
        min: Vec<f64>,
        /// Per-column multiplier
        scale: Vec<f64>,
    },
}

impl Scaler {
    /// Number of columns the scaler was fitted on
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Name used in error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Scaler::Standard { .. } => "StandardScaler",
            Scaler::MinMax { .. } => "MinMaxScaler",
        }
    }

    /// Check the fitted parameters are usable
    pub(crate) fn check(&self) -> Result<(), String> {
        let (offset, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };

        if scale.is_empty() {
            return Err("scaler has no columns".to_string());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "offset has {} columns but scale has {}",
                offset.len(),
                scale.len()
            ));
        }
        if let Some(col) = offset
            .iter()
            .chain(scale.iter())
            .position(|v| !v.is_finite())
        {
            return Err(format!(
                "non-finite parameter in column {}",
                col % scale.len()
            ));
        }
        Ok(())
    }

    /// Scale a batch of rows
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::FeatureCountMismatch`] if `x` does not have
    /// exactly [`Self::n_features`] columns.
    pub fn transform(&self, x: &Matrix) -> Result<Matrix, InferenceError> {
        let expected = self.n_features();
        if x.cols() != expected {
            return Err(InferenceError::FeatureCountMismatch {
                stage: self.name(),
                expected,
                got: x.cols(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => x.map_columns(|col, v| {
                let s = if scale[col] == 0.0 { 1.0 } else { scale[col] };
                (v - mean[col]) / s
            }),
            Scaler::MinMax { min, scale } => x.map_columns(|col, v| v * scale[col] + min[col]),
        };
        Ok(scaled)
    }

    /// Scale a single raw value of column `col` (used to express tree
    /// thresholds in scaled space)
    pub(crate) fn scale_value(&self, col: usize, v: f64) -> f64 {
        match self {
            Scaler::Standard { mean, scale } => {
                let s = if scale[col] == 0.0 { 1.0 } else { scale[col] };
                (v - mean[col]) / s
            },
            Scaler::MinMax { min, scale } => v * scale[col] + min[col],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Scaler {
        Scaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.0],
        }
    }

    #[test]
    fn test_standard_transform() {
        let x = Matrix::from_vec(2, 2, vec![12.0, 3.0, 8.0, -1.0]).unwrap();
        let z = standard().transform(&x).unwrap();
        assert_eq!(z.data(), &[1.0, 3.0, -1.0, -1.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![-0.5],
            scale: vec![0.25],
        };
        let x = Matrix::row_vector(vec![4.0]).unwrap();
        assert_eq!(scaler.transform(&x).unwrap().data(), &[0.5]);
    }

    #[test]
    fn test_transform_preserves_shape() {
        let x = Matrix::row_vector(vec![1.0, 2.0]).unwrap();
        assert_eq!(standard().transform(&x).unwrap().shape(), (1, 2));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let x = Matrix::row_vector(vec![1.0, 2.0, 3.0]).unwrap();
        let err = standard().transform(&x).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X has 3 features, but StandardScaler is expecting 2 features as input."
        );
    }

    #[test]
    fn test_scale_value_matches_transform() {
        let scaler = standard();
        let x = Matrix::row_vector(vec![13.0, 5.0]).unwrap();
        let z = scaler.transform(&x).unwrap();
        assert_eq!(scaler.scale_value(0, 13.0), z.data()[0]);
        assert_eq!(scaler.scale_value(1, 5.0), z.data()[1]);
    }

    #[test]
    fn test_check_rejects_bad_parameters() {
        let empty = Scaler::Standard {
            mean: vec![],
            scale: vec![],
        };
        assert!(empty.check().is_err());

        let ragged = Scaler::MinMax {
            min: vec![0.0],
            scale: vec![1.0, 1.0],
        };
        assert!(ragged.check().unwrap_err().contains("columns"));

        let nan = Scaler::Standard {
            mean: vec![0.0, f64::NAN],
            scale: vec![1.0, 1.0],
        };
        assert_eq!(nan.check().unwrap_err(), "non-finite parameter in column 1");

        assert!(standard().check().is_ok());
    }

    #[test]
    fn test_serde_tag() {
        let json = r#"{"kind":"min_max","min":[0.0],"scale":[0.5]}"#;
        let scaler: Scaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.name(), "MinMaxScaler");
        assert_eq!(scaler.n_features(), 1);

        let out = serde_json::to_string(&standard()).unwrap();
        assert!(out.contains(r#""kind":"standard""#));
    }
}
