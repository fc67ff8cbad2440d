//! Pipeline configuration
//!
//! A single TOML document drives a batch run: input/model paths, data
//! validation rules, feature engineering spans, and logging destinations.

use crate::error::{Result, StockcastError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input and artifact file locations
    pub data: DataConfig,

    /// Raw-data validation rules
    pub validation: ValidationConfig,

    /// Feature engineering parameters
    pub features: FeatureConfig,

    /// Logging destinations and level
    pub logging: LoggingConfig,
}

/// File locations for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Delimited price history file
    pub input_file: PathBuf,

    /// Serialized model bundle
    pub model_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("data/stock_prices.csv"),
            model_file: PathBuf::from("models/stock_price_model.json"),
        }
    }
}

/// Validation rules applied to the raw table after load
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Columns that must be present in the raw file
    pub required_columns: Vec<String>,

    /// Maximum allowed proportion of missing values per required column
    pub max_missing_threshold: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_columns: vec![
                "Stock_Name".to_string(),
                "Date".to_string(),
                "Close".to_string(),
            ],
            max_missing_threshold: 0.1,
        }
    }
}

/// Feature engineering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rolling/lag window sizes
    pub time_spans: Vec<usize>,

    /// Lags applied to the per-ticker price change
    pub price_change_lags: Vec<usize>,

    /// Model input columns, in the exact order the model was fit on
    pub feature_cols: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            time_spans: vec![1, 3, 7, 14],
            price_change_lags: vec![1, 3, 7],
            feature_cols: vec![
                "Stock_encoded".to_string(),
                "rolling_mean_1".to_string(),
                "rolling_mean_3".to_string(),
                "rolling_mean_7".to_string(),
                "rolling_mean_14".to_string(),
                "rolling_std_3".to_string(),
                "rolling_std_7".to_string(),
                "rolling_std_14".to_string(),
                "price_change_lag1".to_string(),
                "price_change_lag3".to_string(),
                "price_change_lag7".to_string(),
                "Price_Trend".to_string(),
            ],
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter applied when RUST_LOG is unset (e.g. "info", "stockcast=debug")
    pub level: String,

    /// Human-readable or JSON structured lines
    pub format: LogFormat,

    /// Optional log file appended to alongside console output
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StockcastError::NotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&raw)
            .map_err(|e| StockcastError::ConfigError(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a valid feature schema
    pub fn validate(&self) -> Result<()> {
        if self.features.time_spans.is_empty() {
            return Err(StockcastError::ConfigError(
                "features.time_spans must not be empty".to_string(),
            ));
        }
        if self.features.time_spans.iter().any(|&s| s == 0) {
            return Err(StockcastError::ConfigError(
                "features.time_spans must not contain 0".to_string(),
            ));
        }
        if self.features.feature_cols.is_empty() {
            return Err(StockcastError::ConfigError(
                "features.feature_cols must not be empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.validation.max_missing_threshold) {
            return Err(StockcastError::ConfigError(format!(
                "validation.max_missing_threshold must be in [0, 1], got {}",
                self.validation.max_missing_threshold
            )));
        }
        Ok(())
    }
}
