//! Per-session input and prediction state.

use report::ReportError;
use vehicle_features::FeatureVector;

/// State owned by one user session.
///
/// Lives as long as the interactive program (or one CLI invocation) and is
/// never written to disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    features: FeatureVector,
    prediction: Option<f64>,
}

impl Session {
    /// Creates a session with default inputs and no prediction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session starting from the given inputs.
    #[must_use]
    pub const fn with_features(features: FeatureVector) -> Self {
        Self {
            features,
            prediction: None,
        }
    }

    /// Current inputs.
    #[must_use]
    pub const fn features(&self) -> &FeatureVector {
        &self.features
    }

    /// Mutable access to the inputs. Setters on [`FeatureVector`] clamp.
    pub const fn features_mut(&mut self) -> &mut FeatureVector {
        &mut self.features
    }

    /// The last successful prediction, if any.
    #[must_use]
    pub const fn prediction(&self) -> Option<f64> {
        self.prediction
    }

    /// Replaces the stored prediction.
    pub const fn record_prediction(&mut self, price: f64) {
        self.prediction = Some(price);
    }

    /// Renders the report for the current inputs and prediction.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingPrediction`] before the first prediction.
    pub fn export_report(&self) -> Result<Vec<u8>, ReportError> {
        report::export(&self.features, self.prediction)
    }
}
