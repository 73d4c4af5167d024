//! Estimators a model artifact can be built from.
//!
//! Every estimator maps a numeric row to a positive-class probability.
//! Ensembles nest: a stacking model's base learners may themselves be
//! forests or further stacks.

use serde::{Deserialize, Serialize};

use crate::backend::ModelError;

/// Logistic function
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Node of a flattened binary decision tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go to `left` when `row[feature] <= threshold`, otherwise `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding the positive-class probability.
    Leaf { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    /// p = sigmoid(w·x + b)
    Logistic { coefficients: Vec<f64>, intercept: f64 },
    Tree { nodes: Vec<TreeNode> },
    /// Mean of the member trees.
    Forest { trees: Vec<Vec<TreeNode>> },
    /// Base learner probabilities (plus the raw row when `passthrough`)
    /// are fed to `final_estimator`.
    Stacking {
        estimators: Vec<Estimator>,
        final_estimator: Box<Estimator>,
        #[serde(default)]
        passthrough: bool,
    },
}

impl Estimator {
    /// Short description, e.g. `stacking(3 base, logistic final)`.
    pub fn summary(&self) -> String {
        match self {
            Estimator::Logistic { coefficients, .. } => {
                format!("logistic({} coefficients)", coefficients.len())
            }
            Estimator::Tree { nodes } => format!("tree({} nodes)", nodes.len()),
            Estimator::Forest { trees } => format!("forest({} trees)", trees.len()),
            Estimator::Stacking {
                estimators,
                final_estimator,
                passthrough,
            } => {
                let base: Vec<String> = estimators.iter().map(Estimator::summary).collect();
                format!(
                    "stacking([{}] -> {}{})",
                    base.join(", "),
                    final_estimator.summary(),
                    if *passthrough { ", passthrough" } else { "" }
                )
            }
        }
    }

    /// Check the estimator is usable on rows of `width` values.
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        match self {
            Estimator::Logistic {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != width {
                    return Err(ModelError::InvalidArtifact(format!(
                        "logistic estimator has {} coefficients for {} inputs",
                        coefficients.len(),
                        width
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::InvalidArtifact(
                        "logistic estimator has non-finite parameters".into(),
                    ));
                }
                Ok(())
            }
            Estimator::Tree { nodes } => validate_tree(nodes, width),
            Estimator::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ModelError::InvalidArtifact("forest has no trees".into()));
                }
                trees.iter().try_for_each(|t| validate_tree(t, width))
            }
            Estimator::Stacking {
                estimators,
                final_estimator,
                passthrough,
            } => {
                if estimators.is_empty() {
                    return Err(ModelError::InvalidArtifact(
                        "stacking model has no base estimators".into(),
                    ));
                }
                for e in estimators {
                    e.validate(width)?;
                }
                let meta_width = estimators.len() + if *passthrough { width } else { 0 };
                final_estimator.validate(meta_width)
            }
        }
    }

    /// Positive-class probability for `row`.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        match self {
            Estimator::Logistic {
                coefficients,
                intercept,
            } => {
                if row.len() != coefficients.len() {
                    return Err(ModelError::InvalidInput(format!(
                        "Expected {} features, got {}",
                        coefficients.len(),
                        row.len()
                    )));
                }
                let z: f64 = coefficients
                    .iter()
                    .zip(row.iter())
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + intercept;
                Ok(sigmoid(z))
            }
            Estimator::Tree { nodes } => walk_tree(nodes, row),
            Estimator::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ModelError::Inference("forest has no trees".into()));
                }
                let mut sum = 0.0;
                for tree in trees {
                    sum += walk_tree(tree, row)?;
                }
                Ok(sum / trees.len() as f64)
            }
            Estimator::Stacking {
                estimators,
                final_estimator,
                passthrough,
            } => {
                let mut meta_row = estimators
                    .iter()
                    .map(|e| e.predict_proba(row))
                    .collect::<Result<Vec<f64>, _>>()?;
                if *passthrough {
                    meta_row.extend_from_slice(row);
                }
                final_estimator.predict_proba(&meta_row)
            }
        }
    }
}

fn validate_tree(nodes: &[TreeNode], width: usize) -> Result<(), ModelError> {
    if nodes.is_empty() {
        return Err(ModelError::InvalidArtifact("tree has no nodes".into()));
    }
    for (i, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= width {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree node {i} splits on input {feature}, only {width} inputs"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree node {i} has a non-finite threshold"
                    )));
                }
                // children after their parent keeps every walk finite
                for child in [*left, *right] {
                    if child <= i || child >= nodes.len() {
                        return Err(ModelError::InvalidArtifact(format!(
                            "tree node {i} points to invalid child {child}"
                        )));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(ModelError::InvalidArtifact(format!(
                        "tree leaf {i} has a non-finite value"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn walk_tree(nodes: &[TreeNode], row: &[f64]) -> Result<f64, ModelError> {
    let mut idx = 0usize;
    // a path can never be longer than the node count
    for _ in 0..nodes.len() {
        match nodes.get(idx) {
            Some(TreeNode::Leaf { value }) => return Ok(*value),
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let x = row.get(*feature).ok_or_else(|| {
                    ModelError::InvalidInput(format!(
                        "tree splits on input {feature}, row has {}",
                        row.len()
                    ))
                })?;
                idx = if x <= threshold { *left } else { *right };
            }
            None => {
                return Err(ModelError::Inference(format!(
                    "tree node {idx} does not exist"
                )))
            }
        }
    }
    Err(ModelError::Inference("tree walk did not reach a leaf".into()))
}
