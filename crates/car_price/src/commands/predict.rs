//! Predict command - prints the estimated selling price for one vehicle.

use anyhow::{Context, Result};
use price_model::PriceModel;
use report::format_price;
use serde::Serialize;
use tracing::info;
use vehicle_features::FeatureVector;

/// Machine readable output of `predict --json`.
#[derive(Debug, Serialize)]
struct PredictionOutput<'a> {
    model: &'static str,
    features: &'a FeatureVector,
    predicted_price: f64,
    formatted_price: String,
}

/// Runs the predict command.
///
/// # Errors
///
/// Returns an error if the model cannot produce a finite price.
pub fn run(model: &PriceModel, features: &FeatureVector, json: bool) -> Result<()> {
    println!("{}", render(model, features, json)?);
    Ok(())
}

fn render(model: &PriceModel, features: &FeatureVector, json: bool) -> Result<String> {
    let price = model.predict(features).context("Prediction failed")?;
    info!(
        model = model.kind(),
        vehicle_age = features.vehicle_age(),
        max_power = features.max_power(),
        engine_size = features.engine_size(),
        diesel = features.fuel_is_diesel(),
        price,
        "Predicted selling price"
    );

    if !json {
        return Ok(format!("Predicted Selling Price: {}", format_price(price)));
    }

    let output = PredictionOutput {
        model: model.kind(),
        features,
        predicted_price: price,
        formatted_price: format_price(price),
    };
    serde_json::to_string_pretty(&output).context("Failed to serialize prediction")
}
