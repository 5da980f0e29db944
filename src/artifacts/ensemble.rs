//! Voting ensemble over decision trees and multinomial linear models
//!
//! Soft voting averages the members' class probabilities; hard voting counts
//! each member's top class. Members carry weights (default 1.0). Ties go to
//! the lowest class index so repeated predictions are identical.

use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;
use crate::{matrix::Matrix, pipeline::InferenceError};

const STAGE: &str = "EnsembleClassifier";

/// How member predictions are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voting {
    /// Weighted average of class probabilities
    #[default]
    Soft,
    /// Weighted count of each member's most likely class
    Hard,
}

/// Multinomial logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// `n_classes` rows of `n_features` coefficients
    pub coef: Vec<Vec<f64>>,
    /// One intercept per class
    pub intercept: Vec<f64>,
}

impl LogisticModel {
    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.coef.len() != n_classes || self.intercept.len() != n_classes {
            return Err(format!(
                "expected {n_classes} coefficient rows and intercepts, got {} and {}",
                self.coef.len(),
                self.intercept.len()
            ));
        }
        if let Some(row) = self.coef.iter().position(|r| r.len() != n_features) {
            return Err(format!(
                "coefficient row {row} has {} entries, model has {n_features} features",
                self.coef[row].len()
            ));
        }
        let finite = self
            .coef
            .iter()
            .flatten()
            .chain(self.intercept.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err("non-finite coefficient".to_string());
        }
        Ok(())
    }

    /// Softmax class probabilities for one row
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let logits: Vec<f64> = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect();
        softmax(&logits)
    }
}

/// A single ensemble member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Decision tree
    DecisionTree(DecisionTree),
    /// Multinomial logistic regression
    Logistic(LogisticModel),
}

impl Estimator {
    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        match self {
            Estimator::DecisionTree(tree) => tree.check(n_features, n_classes),
            Estimator::Logistic(model) => model.check(n_features, n_classes),
        }
    }

    /// Class probabilities for one row
    ///
    /// # Errors
    ///
    /// Propagates tree traversal errors.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        match self {
            Estimator::DecisionTree(tree) => tree.predict_proba(row),
            Estimator::Logistic(model) => Ok(model.predict_proba(row)),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// An ensemble member and its vote weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedEstimator {
    /// Vote weight
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// The member model
    pub model: Estimator,
}

/// Fitted voting ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleClassifier {
    /// Number of input columns
    pub n_features: usize,
    /// Number of classes predicted
    pub n_classes: usize,
    /// Combination rule
    #[serde(default)]
    pub voting: Voting,
    /// Members
    pub estimators: Vec<WeightedEstimator>,
}

impl EnsembleClassifier {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.n_features == 0 || self.n_classes == 0 {
            return Err(format!(
                "n_features and n_classes must be positive, got {} and {}",
                self.n_features, self.n_classes
            ));
        }
        if self.estimators.is_empty() {
            return Err("ensemble has no estimators".to_string());
        }
        for (i, member) in self.estimators.iter().enumerate() {
            if !member.weight.is_finite() || member.weight < 0.0 {
                return Err(format!("estimator {i} has invalid weight {}", member.weight));
            }
            member
                .model
                .check(self.n_features, self.n_classes)
                .map_err(|reason| format!("estimator {i}: {reason}"))?;
        }
        if self.estimators.iter().map(|m| m.weight).sum::<f64>() <= 0.0 {
            return Err("estimator weights sum to zero".to_string());
        }
        Ok(())
    }

    /// Combined class scores for one row
    ///
    /// Soft voting yields averaged probabilities, hard voting yields the
    /// weighted share of votes; both sum to one.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::FeatureCountMismatch`] or
    /// [`InferenceError::NonFiniteInput`] for unusable rows.
    pub fn predict_proba_row(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if row.len() != self.n_features {
            return Err(InferenceError::FeatureCountMismatch {
                stage: STAGE,
                expected: self.n_features,
                got: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::NonFiniteInput { stage: STAGE });
        }

        let mut scores = vec![0.0; self.n_classes];
        let mut total_weight = 0.0;
        for member in &self.estimators {
            let proba = member.model.predict_proba(row)?;
            if proba.len() != self.n_classes {
                return Err(InferenceError::ClassCountMismatch {
                    expected: self.n_classes,
                    got: proba.len(),
                });
            }
            match self.voting {
                Voting::Soft => {
                    for (score, p) in scores.iter_mut().zip(&proba) {
                        *score += member.weight * p;
                    }
                },
                Voting::Hard => {
                    if let Some(score) = argmax(&proba).and_then(|class| scores.get_mut(class)) {
                        *score += member.weight;
                    }
                },
            }
            total_weight += member.weight;
        }

        for score in &mut scores {
            *score /= total_weight;
        }
        Ok(scores)
    }

    /// Predict one class index per row
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::FeatureCountMismatch`] if `x` has the wrong
    /// number of columns, [`InferenceError::NonFiniteInput`] if a row holds
    /// NaN or infinity.
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>, InferenceError> {
        if x.cols() != self.n_features {
            return Err(InferenceError::FeatureCountMismatch {
                stage: STAGE,
                expected: self.n_features,
                got: x.cols(),
            });
        }

        x.iter_rows()
            .map(|row| {
                let scores = self.predict_proba_row(row)?;
                argmax(&scores).ok_or(InferenceError::EmptyPrediction)
            })
            .collect()
    }
}

/// Index of the largest value; the first one wins ties
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {},
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::tree::TreeNode;

    fn stump(feature: usize, left: Vec<f64>, right: Vec<f64>) -> Estimator {
        Estimator::DecisionTree(DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        })
    }

    fn member(model: Estimator, weight: f64) -> WeightedEstimator {
        WeightedEstimator { weight, model }
    }

    fn ensemble(voting: Voting) -> EnsembleClassifier {
        EnsembleClassifier {
            n_features: 2,
            n_classes: 3,
            voting,
            estimators: vec![
                member(stump(0, vec![1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0]), 1.0),
                member(stump(1, vec![0.0, 0.6, 0.4], vec![0.0, 0.4, 0.6]), 1.0),
                member(stump(1, vec![0.0, 0.6, 0.4], vec![0.0, 0.4, 0.6]), 1.0),
            ],
        }
    }

    #[test]
    fn test_check_valid() {
        assert!(ensemble(Voting::Soft).check().is_ok());
    }

    #[test]
    fn test_soft_voting_averages_probabilities() {
        let model = ensemble(Voting::Soft);
        // member 0 -> class 0 (1.0); members 1,2 -> [0, .6, .4]
        let scores = model.predict_proba_row(&[-1.0, -1.0]).unwrap();
        assert!((scores[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((scores[1] - 0.4).abs() < 1e-12);
        assert_eq!(model.predict(&Matrix::row_vector(vec![-1.0, -1.0]).unwrap()).unwrap(), vec![1]);
    }

    #[test]
    fn test_hard_voting_counts_top_classes() {
        let model = ensemble(Voting::Hard);
        let scores = model.predict_proba_row(&[-1.0, -1.0]).unwrap();
        assert!((scores[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((scores[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_weights_change_the_outcome() {
        let mut model = ensemble(Voting::Hard);
        model.estimators[0].weight = 5.0;
        let x = Matrix::row_vector(vec![-1.0, -1.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![0]);
    }

    #[test]
    fn test_ties_go_to_lowest_class() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.7, 0.7]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_predict_batch() {
        let model = ensemble(Voting::Soft);
        let x = Matrix::from_vec(2, 2, vec![1.0, 1.0, -1.0, -1.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let model = ensemble(Voting::Soft);
        let x = Matrix::row_vector(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            model.predict(&x).unwrap_err().to_string(),
            "X has 3 features, but EnsembleClassifier is expecting 2 features as input."
        );
    }

    #[test]
    fn test_non_finite_input() {
        let model = ensemble(Voting::Soft);
        let x = Matrix::row_vector(vec![f64::NAN, 0.0]).unwrap();
        assert!(matches!(
            model.predict(&x),
            Err(InferenceError::NonFiniteInput { .. })
        ));
    }

    #[test]
    fn test_logistic_member() {
        let logistic = LogisticModel {
            coef: vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![0.0, 0.0]],
            intercept: vec![0.0, 0.0, 0.0],
        };
        let proba = logistic.predict_proba(&[2.0, 0.0]);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(argmax(&proba), Some(0));

        let model = EnsembleClassifier {
            n_features: 2,
            n_classes: 3,
            voting: Voting::Soft,
            estimators: vec![member(Estimator::Logistic(logistic), 1.0)],
        };
        assert!(model.check().is_ok());
        let x = Matrix::row_vector(vec![-2.0, 0.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![1]);
    }

    #[test]
    fn test_unchecked_wide_leaf_is_error() {
        for voting in [Voting::Hard, Voting::Soft] {
            let mut model = ensemble(voting);
            model.n_classes = 2;
            let x = Matrix::row_vector(vec![1.0, 1.0]).unwrap();
            assert_eq!(
                model.predict(&x).unwrap_err(),
                InferenceError::ClassCountMismatch {
                    expected: 2,
                    got: 3
                }
            );
        }
    }

    #[test]
    fn test_check_rejects_bad_members() {
        let mut model = ensemble(Voting::Soft);
        model.estimators[1].weight = -1.0;
        assert!(model.check().unwrap_err().contains("estimator 1"));

        let mut model = ensemble(Voting::Soft);
        model.n_classes = 4;
        assert!(model.check().unwrap_err().contains("class weights"));

        let mut model = ensemble(Voting::Soft);
        for m in &mut model.estimators {
            m.weight = 0.0;
        }
        assert_eq!(model.check().unwrap_err(), "estimator weights sum to zero");

        let mut model = ensemble(Voting::Soft);
        model.estimators.clear();
        assert_eq!(model.check().unwrap_err(), "ensemble has no estimators");
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{
            "n_features": 1,
            "n_classes": 2,
            "estimators": [
                {"model": {"kind": "decision_tree", "nodes": [{"value": [1.0, 3.0]}]}}
            ]
        }"#;
        let model: EnsembleClassifier = serde_json::from_str(json).unwrap();
        assert_eq!(model.voting, Voting::Soft);
        assert_eq!(model.estimators[0].weight, 1.0);
        assert!(model.check().is_ok());
        let x = Matrix::row_vector(vec![0.0]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![1]);
    }
}
