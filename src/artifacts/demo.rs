//! Built-in demo artifacts
//!
//! A hand-built three-tree ensemble over six crops. It is not a trained
//! model; it exists so the server can run and be tested without artifacts on
//! disk. Thresholds are written in raw units and mapped into scaled space.

use super::{
    DecisionTree, EnsembleClassifier, Estimator, InferenceArtifacts, LabelDecoder, Scaler,
    TreeNode, Voting, WeightedEstimator,
};
use crate::features::{Field, FEATURE_COUNT};

const CLASSES: [&str; 6] = ["chickpea", "coffee", "cotton", "maize", "muskmelon", "rice"];

/// Column means of a typical crop-recommendation training set
const MEAN: [f64; FEATURE_COUNT] = [50.55, 53.36, 48.15, 25.62, 71.48, 6.47, 103.46];
/// Column standard deviations of the same set
const STD: [f64; FEATURE_COUNT] = [36.92, 32.99, 50.65, 5.06, 22.26, 0.77, 54.96];

impl InferenceArtifacts {
    /// Small built-in artifact set for demos and tests
    #[must_use]
    pub fn demo() -> Self {
        let scaler = Scaler::Standard {
            mean: MEAN.to_vec(),
            scale: STD.to_vec(),
        };

        let split = |field: Field, raw: f64, left: usize, right: usize| TreeNode::Split {
            feature: field.index(),
            threshold: scaler.scale_value(field.index(), raw),
            left,
            right,
        };
        let leaf = |value: [f64; 6]| TreeNode::Leaf {
            value: value.to_vec(),
        };

        // [chickpea, coffee, cotton, maize, muskmelon, rice]
        let climate = DecisionTree {
            nodes: vec![
                split(Field::Rainfall, 150.0, 1, 6),
                split(Field::Humidity, 40.0, 2, 3),
                leaf([8.0, 0.0, 1.0, 1.0, 0.0, 0.0]),
                split(Field::Temperature, 30.0, 4, 5),
                leaf([0.0, 1.0, 2.0, 6.0, 0.0, 1.0]),
                leaf([0.0, 0.0, 1.0, 1.0, 7.0, 1.0]),
                split(Field::Temperature, 22.0, 7, 8),
                leaf([0.0, 6.0, 0.0, 1.0, 0.0, 3.0]),
                leaf([0.0, 1.0, 0.0, 1.0, 0.0, 8.0]),
            ],
        };

        let nutrients = DecisionTree {
            nodes: vec![
                split(Field::Nitrogen, 40.0, 1, 4),
                split(Field::Phosphorus, 55.0, 2, 3),
                leaf([1.0, 1.0, 0.0, 2.0, 4.0, 2.0]),
                leaf([7.0, 0.0, 1.0, 1.0, 0.0, 1.0]),
                split(Field::Potassium, 35.0, 5, 6),
                leaf([0.0, 3.0, 4.0, 2.0, 0.0, 1.0]),
                leaf([0.0, 1.0, 1.0, 2.0, 3.0, 3.0]),
            ],
        };

        let soil_moisture = DecisionTree {
            nodes: vec![
                split(Field::Humidity, 65.0, 1, 4),
                split(Field::Ph, 7.0, 2, 3),
                leaf([2.0, 3.0, 3.0, 2.0, 0.0, 0.0]),
                leaf([6.0, 0.0, 2.0, 2.0, 0.0, 0.0]),
                split(Field::Humidity, 88.0, 5, 6),
                leaf([0.0, 1.0, 1.0, 4.0, 1.0, 3.0]),
                leaf([0.0, 0.0, 0.0, 0.0, 5.0, 5.0]),
            ],
        };

        let classifier = EnsembleClassifier {
            n_features: FEATURE_COUNT,
            n_classes: CLASSES.len(),
            voting: Voting::Soft,
            estimators: [climate, nutrients, soil_moisture]
                .into_iter()
                .map(|tree| WeightedEstimator {
                    weight: 1.0,
                    model: Estimator::DecisionTree(tree),
                })
                .collect(),
        };

        Self {
            scaler,
            classifier,
            labels: LabelDecoder::new(CLASSES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matrix;

    fn predict(raw: [f64; FEATURE_COUNT]) -> String {
        let demo = InferenceArtifacts::demo();
        let x = Matrix::row_vector(raw.to_vec()).unwrap();
        let scaled = demo.scaler().transform(&x).unwrap();
        let index = demo.classifier().predict(&scaled).unwrap()[0];
        demo.labels().decode(index).unwrap().to_string()
    }

    #[test]
    fn test_demo_passes_load_checks() {
        let demo = InferenceArtifacts::demo();
        let rebuilt = InferenceArtifacts::from_parts(
            demo.scaler().clone(),
            demo.classifier().clone(),
            demo.labels().clone(),
        )
        .unwrap();
        assert_eq!(rebuilt, demo);
        assert!(demo.compatibility_warnings().is_empty());
    }

    #[test]
    fn test_demo_predictions() {
        assert_eq!(predict([90.0, 42.0, 43.0, 21.5, 80.0, 6.5, 120.0]), "maize");
        assert_eq!(predict([80.0, 40.0, 40.0, 24.0, 92.0, 6.5, 240.0]), "rice");
        assert_eq!(predict([30.0, 70.0, 80.0, 18.0, 16.0, 7.5, 80.0]), "chickpea");
    }

    #[test]
    fn test_demo_is_deterministic() {
        let demo = InferenceArtifacts::demo();
        assert_eq!(demo, InferenceArtifacts::demo());
    }
}
