//! Command-line interface
//!
//! Thin dispatch over the pipeline driver: run predictions, validate the
//! input data in isolation, or inspect the model bundle.

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::data::{validate_frame, CsvLoader};
use crate::error::Result;
use crate::features::PipelineMode;
use crate::model::ModelBundle;
use crate::pipeline::Pipeline;

fn step_ok(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

#[derive(Parser)]
#[command(name = "stockcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Batch stock price prediction with pre-trained model artifacts")]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the prediction pipeline over the configured input file
    Predict {
        /// Write predictions to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Training-style run: compute observed next-period targets
        /// alongside predictions
        #[arg(long)]
        with_targets: bool,
    },

    /// Load and validate the input data without predicting
    Validate,

    /// Summarize the model bundle components
    Info,
}

/// Dispatch a parsed command against a loaded configuration
pub fn run(cli: Cli, config: PipelineConfig) -> Result<()> {
    match cli.command {
        Some(Commands::Predict {
            output,
            with_targets,
        }) => cmd_predict(&config, output.as_deref(), with_targets),
        Some(Commands::Validate) => cmd_validate(&config),
        Some(Commands::Info) => cmd_info(&config),
        None => cmd_predict(&config, None, false),
    }
}

fn cmd_predict(config: &PipelineConfig, output: Option<&Path>, with_targets: bool) -> Result<()> {
    let mode = if with_targets {
        PipelineMode::Training
    } else {
        PipelineMode::Inference
    };

    let pipeline = Pipeline::from_config(config.clone())?;
    let report = pipeline.run(mode)?;

    step_ok(&format!(
        "{} rows loaded, {} rows after feature engineering, {} outliers removed",
        report.rows_loaded, report.rows_featured, report.outliers_removed
    ));
    step_ok(&format!("{} predictions", report.predictions.len()));

    // Sample of the first predictions, the way a quick sanity check reads
    for (i, pred) in report.predictions.iter().take(10).enumerate() {
        match report.targets.as_ref().and_then(|t| t.get(i)) {
            Some(actual) => println!("    [{}] predicted {:.4}  observed {:.4}", i, pred, actual),
            None => println!("    [{}] predicted {:.4}", i, pred),
        }
    }
    if report.predictions.len() > 10 {
        println!("    ... {} more", report.predictions.len() - 10);
    }

    if let Some(path) = output {
        write_predictions(path, &report.predictions, report.targets.as_deref())?;
        step_ok(&format!("predictions written to {}", path.display()));
    }

    Ok(())
}

fn cmd_validate(config: &PipelineConfig) -> Result<()> {
    let df = CsvLoader::new(&config.data.input_file).load()?;
    let report = validate_frame(
        &df,
        &config.validation.required_columns,
        config.validation.max_missing_threshold,
    )?;

    step_ok(&format!(
        "{} rows x {} columns",
        report.num_rows, report.num_columns
    ));
    for column in &report.missing {
        println!(
            "    {}: {:.2}% missing",
            column.column,
            column.ratio * 100.0
        );
    }

    Ok(())
}

fn cmd_info(config: &PipelineConfig) -> Result<()> {
    let bundle = ModelBundle::load(&config.data.model_file)?;
    let summary = bundle.summary();

    step_ok(&format!("bundle {}", config.data.model_file.display()));
    println!("    components: {}", summary.components.join(", "));
    println!("    features: {}", summary.n_features);
    println!("    vocabulary: {} tickers", summary.vocabulary_size);

    Ok(())
}

fn write_predictions(path: &Path, predictions: &[f64], targets: Option<&[f64]>) -> Result<()> {
    let mut df = match targets {
        Some(targets) => df!(
            "prediction" => predictions,
            "target" => targets
        )?,
        None => df!("prediction" => predictions)?,
    };

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .finish(&mut df)
        .map_err(Into::into)
}
