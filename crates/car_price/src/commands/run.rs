//! Run command - the interactive prediction form.

use std::sync::Arc;

use anyhow::Result;
use config::Config;
use price_model::PriceModel;
use tracing::info;
use vehicle_features::FeatureVector;

use crate::app::{App, Timing};
use crate::session::Session;
use crate::tui;

/// Opens the form with the given starting inputs and blocks until the user
/// quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be driven.
pub fn run(model: Arc<PriceModel>, features: FeatureVector, config: &Config) -> Result<()> {
    let timing = Timing::from(config);
    info!(
        model = model.kind(),
        busy_delay = ?timing.busy_delay,
        frame_interval = ?timing.frame_interval,
        "Starting prediction form"
    );

    let app = App::with_session(model, Session::with_features(features), timing);
    tui::run(app, &config.export_dir)
}
