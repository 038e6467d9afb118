//! Yield regression models loaded from exported training artifacts.
//!
//! Two export shapes are supported:
//!
//! - `linear`: coefficients plus intercept (linear/ridge regression)
//! - `tree_ensemble`: decision trees combined by mean (random forest) or by
//!   sum on top of a base score (gradient boosting)
//!
//! ```json
//! {"kind": "linear", "coefficients": [0.4, -1.2], "intercept": 3.0}
//! ```
//!
//! Tree nodes are stored in a flat array. A split sends a sample left when
//! `x[feature] <= threshold`. Children always sit at a higher index than their
//! parent, which makes every traversal terminate.

use std::path::Path;

use cropwise_core::{Error, Result};
use serde::Deserialize;
use tracing::info;

/// How per-tree outputs are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
}

/// A node of a regression tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::ModelLoad(format!("Tree {} has no nodes", tree_idx)));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} node {} splits on feature {} of {}",
                            tree_idx, idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} node {} has a non-finite threshold",
                            tree_idx, idx
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(Error::ModelLoad(format!(
                                "Tree {} node {} has invalid child {}",
                                tree_idx, idx, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(Error::ModelLoad(format!(
                            "Tree {} leaf {} is not finite",
                            tree_idx, idx
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A trained regressor producing one output per feature vector.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<RegressionTree>,
    },
}

impl RegressionModel {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ModelLoad(format!("Failed to read model {}: {}", path.display(), e))
        })?;
        let model: Self = serde_json::from_str(&text).map_err(|e| {
            Error::ModelLoad(format!("Invalid model {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), kind = model.kind(), "Loaded yield model");
        Ok(model)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegressionModel::Linear { .. } => "linear",
            RegressionModel::TreeEnsemble { .. } => "tree_ensemble",
        }
    }

    /// Check the model against the width of the feature vectors it will see.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        match self {
            RegressionModel::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(Error::ModelLoad(format!(
                        "Linear model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(Error::ModelLoad(
                        "Linear model parameters must be finite".to_string(),
                    ));
                }
            }
            RegressionModel::TreeEnsemble { trees, .. } => {
                if trees.is_empty() {
                    return Err(Error::ModelLoad("Tree ensemble has no trees".to_string()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(i, n_features)?;
                }
            }
        }
        Ok(())
    }

    /// Predict from a scaled feature vector. The caller guarantees the width
    /// passed to [`RegressionModel::validate`].
    pub fn predict(&self, x: &[f64]) -> f64 {
        match self {
            RegressionModel::Linear {
                coefficients,
                intercept,
            } => intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>(),
            RegressionModel::TreeEnsemble {
                aggregation,
                base_score,
                trees,
            } => {
                let total: f64 = trees.iter().map(|t| t.predict(x)).sum();
                match aggregation {
                    Aggregation::Mean => base_score + total / trees.len() as f64,
                    Aggregation::Sum => base_score + total,
                }
            }
        }
    }
}
