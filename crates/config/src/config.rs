//! Configuration loading from environment variables.

use core::time::Duration;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default location of the serialized price model.
pub const DEFAULT_MODEL_PATH: &str = "models/decision_tree_model.json";

/// Minimum time the busy indicator stays on screen after Predict.
pub const DEFAULT_BUSY_DELAY: Duration = Duration::from_millis(1000);

/// Pause between two frames of the price counter animation.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the model artifact loaded at startup.
    pub model_path: PathBuf,

    /// Directory exported reports are written into.
    pub export_dir: PathBuf,

    /// Directory for the interactive session's log file.
    pub log_dir: PathBuf,

    /// Minimum duration of the "Predicting..." indicator.
    pub busy_delay: Duration,

    /// Interval between animation frames.
    pub frame_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            export_dir: PathBuf::from("."),
            log_dir: PathBuf::from("target/logs"),
            busy_delay: DEFAULT_BUSY_DELAY,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `CAR_PRICE_MODEL_PATH`: model artifact (default: `models/decision_tree_model.json`)
    /// - `CAR_PRICE_EXPORT_DIR`: where downloaded reports go (default: `.`)
    /// - `CAR_PRICE_LOG_DIR`: log directory for the terminal UI (default: `target/logs`)
    /// - `CAR_PRICE_BUSY_DELAY_MS`: busy indicator duration (default: `1000`)
    /// - `CAR_PRICE_FRAME_INTERVAL_MS`: animation frame interval (default: `10`)
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let model_path = lookup("CAR_PRICE_MODEL_PATH").map_or(defaults.model_path, PathBuf::from);
        let export_dir = lookup("CAR_PRICE_EXPORT_DIR").map_or(defaults.export_dir, PathBuf::from);
        let log_dir = lookup("CAR_PRICE_LOG_DIR").map_or(defaults.log_dir, PathBuf::from);

        let busy_delay = parse_millis(&lookup, "CAR_PRICE_BUSY_DELAY_MS")?
            .unwrap_or(defaults.busy_delay);
        let frame_interval = parse_millis(&lookup, "CAR_PRICE_FRAME_INTERVAL_MS")?
            .unwrap_or(defaults.frame_interval);

        Ok(Self {
            model_path,
            export_dir,
            log_dir,
            busy_delay,
            frame_interval,
        })
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .with_context(|| format!("{key} must be a whole number of milliseconds, got {raw:?}"))
        })
        .transpose()
}
