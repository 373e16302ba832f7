//! Car Price Predictor
//!
//! Interactive and one-shot selling price estimates with PDF export.

use std::path::PathBuf;

use anyhow::Result;
use car_price::commands::{self, VehicleArgs};
use car_price::logging;
use clap::{Parser, Subcommand};
use config::Config;
use tracing::info;

/// Car Price Predictor
#[derive(Parser)]
#[command(name = "car-price")]
#[command(about = "Estimate a used car's selling price and export it as a PDF")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model artifact to load (overrides `CAR_PRICE_MODEL_PATH`)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive prediction form (default)
    Run {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },

    /// Print the predicted selling price for one vehicle
    Predict {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Print a JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Predict and write the PDF report
    Export {
        #[command(flatten)]
        vehicle: VehicleArgs,

        /// Where to write the report (default: `<export dir>/car_price_prediction.pdf`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(model_path) = cli.model {
        config.model_path = model_path;
    }

    let command = cli.command.unwrap_or(Commands::Run {
        vehicle: VehicleArgs::default(),
    });

    if let Commands::Run { .. } = command {
        let log_path = logging::init_file(cli.verbose, &config.log_dir)?;
        eprintln!("Logging to {}", log_path.display());
    } else {
        logging::init_console(cli.verbose)?;
    }

    let model = commands::load_model(&config.model_path)?;
    info!(
        path = %config.model_path.display(),
        kind = model.kind(),
        nodes = model.node_count(),
        "Model loaded"
    );

    match command {
        Commands::Run { vehicle } => {
            commands::run::run(model, vehicle.features(), &config)?;
        }
        Commands::Predict { vehicle, json } => {
            commands::predict::run(&model, &vehicle.features(), json)?;
        }
        Commands::Export { vehicle, output } => {
            let path = commands::export::run(
                &model,
                &vehicle.features(),
                output.as_deref(),
                &config.export_dir,
            )?;
            println!("Saved {}", path.display());
        }
    }

    Ok(())
}
