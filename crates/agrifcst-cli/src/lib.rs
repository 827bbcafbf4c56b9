//! Command-line boundary for agrifcst.
//!
//! Loads a long-format price CSV into a [`PricePredictor`], runs one
//! command and renders its result as a single JSON document. The binary
//! in `main.rs` only parses arguments, sets up logging and prints.

pub mod conversion;
pub mod error_handling;
pub mod loader;
pub mod types;

use agrifcst_core::{PredictorOptions, PricePredictor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use error_handling::{cli_try, error_json, CliError, CliResult, EXIT_FAILURE};
pub use types::*;

#[derive(Parser, Debug)]
#[command(name = "agrifcst")]
#[command(about = "Monthly crop price forecasting", long_about = None)]
pub struct Cli {
    /// Long-format price CSV with columns crop, month, value
    #[arg(long, global = true, default_value = "crop_prices.csv")]
    pub data: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the crops in the data file
    Crops,

    /// Show the most recent prices of a crop
    Historical {
        #[arg(short, long)]
        crop: String,

        /// Number of months to return
        #[arg(short, long, default_value_t = 24)]
        months: u32,
    },

    /// Forecast future monthly prices, training the crop first if needed
    Predict {
        #[arg(short, long)]
        crop: String,

        /// Number of months to forecast
        #[arg(short, long, default_value_t = 3)]
        months: usize,
    },

    /// Train and report model selection for one crop or all crops
    Train {
        #[arg(short, long)]
        crop: Option<String>,
    },
}

pub fn crops(predictor: &PricePredictor) -> CropsResponse {
    CropsResponse::new(predictor.crop_list())
}

pub fn historical(predictor: &PricePredictor, crop: &str, months: u32) -> CliResult<HistoricalResponse> {
    let slice = predictor.historical(crop, months)?;
    Ok(HistoricalResponse::from(&slice))
}

/// Forecast `months` months, training the crop first when it has no model.
pub fn predict(predictor: &mut PricePredictor, crop: &str, months: usize) -> CliResult<PredictResponse> {
    if !predictor.is_trained(crop) {
        predictor.train(crop)?;
    }
    let result = predictor.predict(crop, months)?;
    Ok(PredictResponse::from(&result))
}

/// Train one crop (failure is an error) or every crop (failures are reported).
pub fn train(predictor: &mut PricePredictor, crop: Option<&str>) -> CliResult<TrainResponse> {
    let entries = match crop {
        Some(crop) => {
            let report = predictor.train(crop)?;
            vec![TrainEntry::trained(&report)]
        }
        None => predictor
            .train_all()
            .into_iter()
            .map(|(crop, outcome)| match outcome {
                Ok(report) => TrainEntry::trained(&report),
                Err(e) => TrainEntry::failed(&crop, e.to_string()),
            })
            .collect(),
    };
    Ok(TrainResponse::new(entries))
}

/// Execute a command against an already loaded session.
pub fn execute(predictor: &mut PricePredictor, command: &Commands) -> CliResult<String> {
    let json = match command {
        Commands::Crops => serde_json::to_string(&crops(predictor))?,
        Commands::Historical { crop, months } => {
            serde_json::to_string(&historical(predictor, crop, *months)?)?
        }
        Commands::Predict { crop, months } => {
            serde_json::to_string(&predict(predictor, crop, *months)?)?
        }
        Commands::Train { crop } => serde_json::to_string(&train(predictor, crop.as_deref())?)?,
    };
    Ok(json)
}

/// Load the data file and execute the parsed command.
pub fn run(cli: &Cli) -> CliResult<String> {
    let mut predictor = loader::load_predictor(&cli.data, PredictorOptions::default())?;
    execute(&mut predictor, &cli.command)
}
