//! Linear regression over the model input row.

use serde::Deserialize;
use vehicle_features::FEATURE_COUNT;

/// `intercept + Σ coefficients[i] * row[i]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressor {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearRegressor {
    /// Creates a linear model.
    #[must_use]
    pub const fn new(intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Evaluates the model on one row.
    #[must_use]
    pub fn predict_row(&self, row: &[f64; FEATURE_COUNT]) -> f64 {
        self.coefficients
            .iter()
            .zip(row)
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}
