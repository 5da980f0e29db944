use serde::{Deserialize, Serialize};

use crate::pipeline::InferenceError;

/// One node of a flattened decision tree
///
/// Nodes are stored in a single vector with the root at index 0. Children
/// always sit at a higher index than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Internal node: go `left` when `x[feature] <= threshold`, else `right`
    Split {
        /// Column tested at this node
        feature: usize,
        /// Split threshold (in scaled feature space)
        threshold: f64,
        /// Index of the left child
        left: usize,
        /// Index of the right child
        right: usize,
    },
    /// Leaf holding per-class weights (sample counts or probabilities)
    Leaf {
        /// One non-negative weight per class
        value: Vec<f64>,
    },
}

/// A fitted decision tree classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Flattened nodes, root first
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub(crate) fn check(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child {child}"));
                        }
                    }
                },
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {i} has {} class weights, model has {n_classes} classes",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {i} has a negative or non-finite weight"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {i} has no weight"));
                    }
                },
            }
        }
        Ok(())
    }

    /// Normalized class probabilities of the leaf `row` lands in
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::MalformedTree`] if traversal reaches a node
    /// index outside the tree.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row
                        .get(*feature)
                        .ok_or(InferenceError::MalformedTree { node: index })?;
                    index = if *x <= *threshold { *left } else { *right };
                },
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    return Ok(value.iter().map(|w| w / total).collect());
                },
                None => return Err(InferenceError::MalformedTree { node: index }),
            }
        }
    }
}
