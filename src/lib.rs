//! stockcast - batch stock price prediction
//!
//! Loads historical stock prices, engineers per-ticker time-series features,
//! removes outlier rows, scales features, and applies a pre-trained
//! regression bundle to predict next-period closing prices.
//!
//! # Modules
//!
//! - [`data`] - CSV loading and raw-table validation
//! - [`features`] - per-ticker lag/rolling/trend feature engineering
//! - [`model`] - the pre-trained artifact bundle (regressor, encoder, scalers)
//! - [`anomaly`] - outlier predicate and the bundled isolation forest
//! - [`pipeline`] - stage drivers, outlier filter, prediction adapter, timing
//! - [`config`] - TOML run configuration
//! - [`cli`] - command-line interface

pub mod anomaly;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;

pub use error::{Result, StockcastError};

use config::{LogFormat, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Initialize tracing for a pipeline run.
///
/// Console output always; a file layer is added when the configuration names
/// a log file. `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = vec![filter.boxed()];

    layers.push(match config.format {
        LogFormat::Text => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    });

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let file_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
        layers.push(match config.format {
            LogFormat::Text => file_layer.boxed(),
            LogFormat::Json => file_layer.json().boxed(),
        });
    }

    tracing::subscriber::set_global_default(Registry::default().with(layers)).map_err(|e| {
        StockcastError::ConfigError(format!("failed to initialize logging: {}", e))
    })
}
