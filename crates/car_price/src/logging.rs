//! Tracing subscriber setup.
//!
//! Commands that print to the terminal log to stderr. The interactive form
//! owns the screen, so it logs to a file under the configured log directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "car_price.log";

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Logs to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_console(verbose: bool) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(console_layer)
        .try_init()
        .context("Failed to install console logger")
}

/// Logs to `<log_dir>/car_price.log`, truncating any previous run.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global subscriber
/// is already installed.
pub fn init_file(verbose: bool, log_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join(LOG_FILE_NAME);
    let log_file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let file_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .with_writer(log_file);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .try_init()
        .context("Failed to install file logger")?;

    Ok(path)
}
