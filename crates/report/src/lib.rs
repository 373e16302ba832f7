//! Printable report of a car price prediction.
//!
//! [`export`] lays out the vehicle attributes and the predicted price as a
//! fixed sequence of text cells and renders them to a single-page PDF held in
//! memory. Nothing is written to disk here; the caller decides where the
//! bytes go, using [`FILE_NAME`] and [`MIME_TYPE`].

use thiserror::Error;
use tracing::info;
use vehicle_features::{FeatureVector, format_power};

mod money;
mod pdf;

pub use money::{CURRENCY_SYMBOL, format_amount, format_price};

/// File name offered for the downloaded report.
pub const FILE_NAME: &str = "car_price_prediction.pdf";

/// MIME type of the downloaded report.
pub const MIME_TYPE: &str = "application/pdf";

/// Title printed at the top of the report.
pub const TITLE: &str = "Car Price Prediction";

/// Errors raised while producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Export was requested before any prediction was made.
    #[error("no prediction available to export")]
    MissingPrediction,

    /// The PDF writer rejected the document.
    #[error("failed to render PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the document into the buffer failed.
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Font weight of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Horizontal alignment of a cell within the printable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// One line of text with its typography and vertical placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub weight: Weight,
    /// Font size in points.
    pub size_pt: u16,
    /// Cell height in millimetres.
    pub height_mm: f64,
    pub align: Align,
    /// Blank space above the cell in millimetres.
    pub space_before_mm: f64,
}

impl Cell {
    fn new(text: String, weight: Weight, size_pt: u16, height_mm: f64) -> Self {
        Self {
            text,
            weight,
            size_pt,
            height_mm,
            align: Align::Left,
            space_before_mm: 0.0,
        }
    }

    fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    fn after_gap(mut self, mm: f64) -> Self {
        self.space_before_mm = mm;
        self
    }
}

/// The report content, independent of the output format.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    cells: Vec<Cell>,
}

impl ReportLayout {
    /// Lays out the report for a vehicle and its predicted price.
    #[must_use]
    pub fn new(features: &FeatureVector, prediction: f64) -> Self {
        let body = |text: String| Cell::new(text, Weight::Regular, 12, 8.0);

        let cells = vec![
            Cell::new(TITLE.to_string(), Weight::Bold, 16, 10.0).centered(),
            body(format!("Vehicle Age: {} years", features.vehicle_age())).after_gap(10.0),
            body(format!("Max Power: {} bhp", format_power(features.max_power()))),
            body(format!("Engine Size: {} cc", features.engine_size())),
            body(format!("Fuel Type: {}", features.fuel_label())),
            Cell::new(
                format!("Predicted Selling Price: {}", format_price(prediction)),
                Weight::Bold,
                14,
                10.0,
            )
            .after_gap(5.0),
        ];

        Self { cells }
    }

    /// The cells in reading order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Plain text of every cell, in reading order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|cell| cell.text.as_str())
    }

    /// Renders the layout as a single-page PDF.
    ///
    /// # Errors
    ///
    /// Returns an error if the PDF writer fails.
    pub fn to_pdf(&self) -> Result<Vec<u8>, ReportError> {
        pdf::render(&self.cells)
    }
}

/// Produces the PDF report for the current inputs and prediction.
///
/// The document is rebuilt on every call; identical inputs give identical
/// bytes.
///
/// # Arguments
///
/// * `features` - The vehicle attributes the prediction was made for.
/// * `prediction` - The predicted price, `None` if no prediction exists yet.
///
/// # Errors
///
/// Returns [`ReportError::MissingPrediction`] if `prediction` is `None`, or a
/// rendering error from the PDF writer.
pub fn export(features: &FeatureVector, prediction: Option<f64>) -> Result<Vec<u8>, ReportError> {
    let prediction = prediction.ok_or(ReportError::MissingPrediction)?;
    let bytes = ReportLayout::new(features, prediction).to_pdf()?;

    info!(bytes = bytes.len(), price = prediction, "Exported prediction report");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    fn sample() -> (FeatureVector, f64) {
        (FeatureVector::new(5, 80.0, 1500, false), 452_345.67)
    }

    #[test]
    fn test_layout_text() {
        let (features, price) = sample();
        let layout = ReportLayout::new(&features, price);
        let lines: Vec<_> = layout.text_lines().collect();
        assert_eq!(
            lines,
            [
                "Car Price Prediction",
                "Vehicle Age: 5 years",
                "Max Power: 80.0 bhp",
                "Engine Size: 1500 cc",
                "Fuel Type: Other",
                "Predicted Selling Price: R452,345.67",
            ]
        );
    }

    #[test]
    fn test_layout_typography() {
        let (features, price) = sample();
        let layout = ReportLayout::new(&features, price);
        let cells = layout.cells();

        assert_eq!(cells[0].align, Align::Center);
        assert_eq!(cells[0].weight, Weight::Bold);
        assert!(cells[1..5].iter().all(|c| c.align == Align::Left && c.weight == Weight::Regular));
        assert_eq!(cells[5].weight, Weight::Bold);
        assert_eq!(cells[5].size_pt, 14);
    }

    #[test]
    fn test_diesel_and_fractional_power() {
        let layout = ReportLayout::new(&FeatureVector::new(0, 123.5, 2500, true), 100.0);
        let lines: Vec<_> = layout.text_lines().collect();
        assert!(lines.contains(&"Max Power: 123.5 bhp"));
        assert!(lines.contains(&"Fuel Type: Diesel"));
        assert!(lines.contains(&"Predicted Selling Price: R100.00"));
    }

    #[test]
    fn test_export_contains_report_text() {
        let (features, price) = sample();
        let bytes = export(&features, Some(price)).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        for line in [
            "Car Price Prediction",
            "Vehicle Age: 5 years",
            "Max Power: 80.0 bhp",
            "Engine Size: 1500 cc",
            "Fuel Type: Other",
            "Predicted Selling Price: R452,345.67",
        ] {
            assert!(contains(&bytes, line), "missing {line:?}");
        }
    }

    #[test]
    fn test_export_is_single_page() {
        let (features, price) = sample();
        let bytes = export(&features, Some(price)).unwrap();
        let document = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(document.get_pages().len(), 1);
    }

    #[test]
    fn test_export_without_prediction() {
        let err = export(&FeatureVector::default(), None).unwrap_err();
        assert!(matches!(err, ReportError::MissingPrediction));
    }

    #[test]
    fn test_export_is_repeatable() {
        let (features, price) = sample();
        let first = export(&features, Some(price)).unwrap();
        let second = export(&features, Some(price)).unwrap();
        assert_eq!(first, second);
    }
}
