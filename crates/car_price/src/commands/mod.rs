//! CLI command implementations.

pub mod export;
pub mod predict;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use price_model::PriceModel;
use tracing::warn;
use vehicle_features::FeatureVector;

/// Vehicle attributes given on the command line.
#[derive(Debug, Clone, PartialEq, Args)]
pub struct VehicleArgs {
    /// Vehicle age in years (0-14)
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    pub vehicle_age: i64,

    /// Maximum power in bhp (30-200)
    #[arg(long, default_value_t = 80.0, allow_negative_numbers = true)]
    pub max_power: f64,

    /// Engine size in cc (500-2500)
    #[arg(long, default_value_t = 1500, allow_negative_numbers = true)]
    pub engine_size: i64,

    /// The vehicle runs on diesel
    #[arg(long)]
    pub diesel: bool,
}

impl Default for VehicleArgs {
    fn default() -> Self {
        let features = FeatureVector::default();
        Self {
            vehicle_age: features.vehicle_age(),
            max_power: features.max_power(),
            engine_size: features.engine_size(),
            diesel: features.fuel_is_diesel(),
        }
    }
}

impl VehicleArgs {
    /// Builds the feature vector, warning about every value that had to be
    /// clamped.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        let features = FeatureVector::new(
            self.vehicle_age,
            self.max_power,
            self.engine_size,
            self.diesel,
        );

        if features.vehicle_age() != self.vehicle_age {
            warn!(
                requested = self.vehicle_age,
                used = features.vehicle_age(),
                "Vehicle age out of range, clamped"
            );
        }
        if features.max_power().to_bits() != self.max_power.to_bits() {
            warn!(
                requested = self.max_power,
                used = features.max_power(),
                "Max power out of range, clamped"
            );
        }
        if features.engine_size() != self.engine_size {
            warn!(
                requested = self.engine_size,
                used = features.engine_size(),
                "Engine size out of range, clamped"
            );
        }

        features
    }
}

/// Loads the model artifact once for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if the artifact is missing or malformed.
pub fn load_model(path: &Path) -> Result<Arc<PriceModel>> {
    let model = PriceModel::load(path)
        .with_context(|| format!("Failed to load price model from {}", path.display()))?;
    Ok(Arc::new(model))
}
