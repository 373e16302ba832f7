//! Export command - predicts once and writes the PDF report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use price_model::PriceModel;
use tracing::info;
use vehicle_features::FeatureVector;

use crate::download::Download;
use crate::session::Session;

/// Runs the export command and returns where the report was written.
///
/// With no `output`, the report lands in `export_dir` under its fixed name.
///
/// # Errors
///
/// Returns an error if the prediction, the rendering or the write fails.
pub fn run(
    model: &PriceModel,
    features: &FeatureVector,
    output: Option<&Path>,
    export_dir: &Path,
) -> Result<PathBuf> {
    let mut session = Session::with_features(*features);
    let price = model.predict(features).context("Prediction failed")?;
    session.record_prediction(price);

    let bytes = session
        .export_report()
        .context("Failed to render prediction report")?;
    let download = Download::report(bytes);

    let path = match output {
        Some(path) => {
            download.save_as(path)?;
            path.to_path_buf()
        }
        None => download.save_into(export_dir)?,
    };

    info!(path = %path.display(), price, "Exported prediction report");
    Ok(path)
}
