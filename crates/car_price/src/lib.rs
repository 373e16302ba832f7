//! Car Price Predictor
//!
//! Estimates a used car's selling price from four attributes with a
//! pre-trained regressor, animates the result in a terminal form and exports
//! it as a one-page PDF report.

pub mod animation;
pub mod app;
pub mod commands;
pub mod download;
pub mod logging;
pub mod session;
pub mod tui;
pub mod widgets;
