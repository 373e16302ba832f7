//! Price model crate for the car price predictor.
//!
//! Loads a regressor that was trained and exported elsewhere and runs it on a
//! [`FeatureVector`]. The model is read once at startup and never mutated, so
//! callers share it behind an `Arc` without locking.
//!
//! The artifact is a JSON document tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "decision_tree",
//!   "n_features": 4,
//!   "children_left":  [1, -1, -1],
//!   "children_right": [2, -1, -1],
//!   "feature":        [0, -2, -2],
//!   "threshold":      [4.5, -2.0, -2.0],
//!   "value":          [0.0, 650000.0, 300000.0]
//! }
//! ```
//!
//! or `{"kind": "linear", "intercept": ..., "coefficients": [...]}`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use vehicle_features::FeatureVector;

mod linear;
mod tree;

pub use linear::LinearRegressor;
pub use tree::{DecisionTreeRegressor, LEAF};

/// Errors raised while loading a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The artifact could not be read.
    #[error("failed to read model artifact {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or does not match a known model kind.
    #[error("malformed model artifact: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The tree arrays do not describe a well-formed tree.
    #[error("invalid decision tree at node {node}: {reason}")]
    InvalidTree { node: usize, reason: String },

    /// The artifact was trained on a different number of inputs.
    #[error("model declares {found} features, expected {expected}")]
    FeatureCount { expected: usize, found: usize },
}

/// Errors raised by a single prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    /// The model produced NaN or an infinity.
    #[error("model produced a non-finite price ({value}) for {features:?}")]
    NonFinite { value: f64, features: FeatureVector },
}

/// A loaded, immutable price regressor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceModel {
    /// Regression tree in exported array form.
    DecisionTree(DecisionTreeRegressor),
    /// Plain linear regression.
    Linear(LinearRegressor),
}

impl From<DecisionTreeRegressor> for PriceModel {
    fn from(tree: DecisionTreeRegressor) -> Self {
        Self::DecisionTree(tree)
    }
}

impl From<LinearRegressor> for PriceModel {
    fn from(linear: LinearRegressor) -> Self {
        Self::Linear(linear)
    }
}

impl PriceModel {
    /// Loads a model artifact from disk.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or does not
    /// describe a valid model.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&raw)?;

        info!(
            path = %path.display(),
            kind = model.kind(),
            nodes = model.node_count(),
            "Loaded price model"
        );

        Ok(model)
    }

    /// Parses a model artifact held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a valid model.
    pub fn from_json_str(raw: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Short name of the model kind, as written in the artifact.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DecisionTree(_) => "decision_tree",
            Self::Linear(_) => "linear",
        }
    }

    /// Number of tree nodes; zero for non-tree models.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::DecisionTree(tree) => tree.node_count(),
            Self::Linear(_) => 0,
        }
    }

    /// Predicts the selling price of a vehicle.
    ///
    /// Pure and deterministic: the same model and features always give the
    /// same bits.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::NonFinite`] if the model output is NaN or
    /// infinite.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let row = features.to_model_input();
        let value = match self {
            Self::DecisionTree(tree) => tree.predict_row(&row),
            Self::Linear(linear) => linear.predict_row(&row),
        };

        if !value.is_finite() {
            return Err(PredictError::NonFinite {
                value,
                features: *features,
            });
        }

        debug!(?row, price = value, "Predicted selling price");
        Ok(value)
    }
}
