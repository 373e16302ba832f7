//! Regression tree inference over exported array form.
//!
//! The artifact stores the tree as parallel arrays indexed by node id, the
//! layout scikit-learn exposes through `tree_`. Node 0 is the root; a node is
//! a leaf when its left child is [`LEAF`].

use serde::Deserialize;
use vehicle_features::{FEATURE_COUNT, FEATURE_NAMES};

use crate::ModelError;

/// Child index marking a leaf node.
pub const LEAF: i64 = -1;

/// Parallel node arrays as they appear in the artifact.
#[derive(Debug, Clone, Deserialize)]
struct TreeArrays {
    n_features: usize,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl TryFrom<TreeArrays> for DecisionTreeRegressor {
    type Error = ModelError;

    fn try_from(arrays: TreeArrays) -> Result<Self, Self::Error> {
        Self::new(
            arrays.n_features,
            arrays.children_left,
            arrays.children_right,
            arrays.feature,
            arrays.threshold,
            arrays.value,
        )
    }
}

/// A validated single-output regression tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TreeArrays")]
pub struct DecisionTreeRegressor {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

impl DecisionTreeRegressor {
    /// Builds a tree from its node arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if the arrays disagree in length, the tree is empty,
    /// a child does not come after its parent, or a split references a
    /// feature outside the model input.
    pub fn new(
        n_features: usize,
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if n_features != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                found: n_features,
            });
        }

        let node_count = children_left.len();
        if node_count == 0 {
            return Err(ModelError::InvalidTree {
                node: 0,
                reason: "tree has no nodes".to_string(),
            });
        }
        for (name, len) in [
            ("children_right", children_right.len()),
            ("feature", feature.len()),
            ("threshold", threshold.len()),
            ("value", value.len()),
        ] {
            if len != node_count {
                return Err(ModelError::InvalidTree {
                    node: 0,
                    reason: format!("{name} has {len} entries, expected {node_count}"),
                });
            }
        }

        let tree = Self {
            children_left,
            children_right,
            feature,
            threshold,
            value,
        };
        for node in 0..node_count {
            tree.check_node(node)?;
        }
        Ok(tree)
    }

    fn check_node(&self, node: usize) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidTree { node, reason };
        let node_count = self.node_count();
        let left = self.children_left[node];
        let right = self.children_right[node];

        if left == LEAF {
            if right != LEAF {
                return Err(invalid(format!("leaf has a right child {right}")));
            }
            if !self.value[node].is_finite() {
                return Err(invalid(format!("leaf value {} is not finite", self.value[node])));
            }
            return Ok(());
        }

        // Children strictly after the parent rules out cycles.
        for child in [left, right] {
            let in_range = usize::try_from(child).is_ok_and(|c| c > node && c < node_count);
            if !in_range {
                return Err(invalid(format!("child index {child} out of order")));
            }
        }

        let feature = self.feature[node];
        let Some(name) = usize::try_from(feature)
            .ok()
            .and_then(|index| FEATURE_NAMES.get(index))
        else {
            return Err(invalid(format!(
                "split on unknown feature {feature}, expected an index into {FEATURE_NAMES:?}"
            )));
        };
        if self.threshold[node].is_nan() {
            return Err(invalid(format!("split threshold on {name} is NaN")));
        }
        Ok(())
    }

    /// Number of nodes, internal and leaf.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.children_left.iter().filter(|&&left| left == LEAF).count()
    }

    /// Routes a row to its leaf and returns the leaf value.
    ///
    /// Feature values are rounded to `f32` before comparison, matching how
    /// the tree was fitted.
    #[must_use]
    pub fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        let mut node = 0;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let x = f64::from(row[self.feature[node] as usize] as f32);
            let next = if x <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = next as usize;
        }
    }
}
