//! Native evaluation of exported tree ensembles
//!
//! Random forests and gradient boosted trees are exported as flat node arrays
//! per tree. Node 0 is the root and children always sit at a higher index than
//! their parent, which keeps traversal bounded.

use super::Regressor;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Average of tree outputs (random forest)
    #[default]
    Mean,
    /// Sum of tree outputs (boosting)
    Sum,
}

/// Comparison used at split nodes; the left branch is taken when it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitRule {
    /// `value <= threshold` (scikit-learn)
    #[default]
    Lte,
    /// `value < threshold` (XGBoost)
    Lt,
}

/// A single tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// On-disk document for a tree ensemble artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub feature_importances: HashMap<String, f64>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub split: SplitRule,
    pub trees: Vec<Tree>,
}

/// Validated, ready-to-evaluate ensemble
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    aggregation: Aggregation,
    split: SplitRule,
    base_score: f64,
    n_features: usize,
}

impl TreeEnsemble {
    pub fn new(
        trees: Vec<Tree>,
        aggregation: Aggregation,
        split: SplitRule,
        base_score: f64,
        n_features: usize,
    ) -> Result<Self> {
        if trees.is_empty() {
            bail!("ensemble has no trees");
        }
        if !base_score.is_finite() {
            bail!("base_score must be finite");
        }
        for (t, tree) in trees.iter().enumerate() {
            validate_tree(tree, n_features).map_err(|e| anyhow::anyhow!("tree {}: {}", t, e))?;
        }
        Ok(Self {
            trees,
            aggregation,
            split,
            base_score,
            n_features,
        })
    }

    /// Single-leaf ensemble that always predicts `value`
    pub fn constant(value: f64, n_features: usize) -> Result<Self> {
        Self::new(
            vec![Tree {
                nodes: vec![Node::Leaf { leaf: value }],
            }],
            Aggregation::Mean,
            SplitRule::Lte,
            0.0,
            n_features,
        )
    }

    pub fn from_document(doc: &TreeEnsembleDocument) -> Result<Self> {
        Self::new(
            doc.trees.clone(),
            doc.aggregation,
            doc.split,
            doc.base_score,
            doc.feature_names.len(),
        )
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn eval_tree(&self, tree: &Tree, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &tree.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let x = features[*feature];
                    let go_left = match self.split {
                        SplitRule::Lte => x <= *threshold,
                        SplitRule::Lt => x < *threshold,
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

impl Regressor for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            bail!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            );
        }
        let total: f64 = self.trees.iter().map(|t| self.eval_tree(t, features)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };
        Ok(self.base_score + combined)
    }

    fn backend(&self) -> &'static str {
        "tree_ensemble"
    }
}

fn validate_tree(tree: &Tree, n_features: usize) -> Result<()> {
    if tree.nodes.is_empty() {
        bail!("tree has no nodes");
    }
    let len = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Leaf { leaf } => {
                if !leaf.is_finite() {
                    bail!("node {} has a non-finite leaf value", i);
                }
            }
            Node::Split {
                feature,
                left,
                right,
                ..
            } => {
                if *feature >= n_features {
                    bail!("node {} splits on feature {} of {}", i, feature, n_features);
                }
                for child in [*left, *right] {
                    if child <= i || child >= len {
                        bail!("node {} has invalid child index {}", i, child);
                    }
                }
            }
        }
    }
    Ok(())
}
