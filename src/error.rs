//! Error types for the stockcast pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, StockcastError>;

/// Main error type for the stockcast pipeline
#[derive(Error, Debug)]
pub enum StockcastError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Model load error: {0}")]
    ModelLoadError(String),

    #[error("Invalid schema: feature column not found: {0}")]
    InvalidSchema(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Unknown entity: {0} is not in the trained vocabulary")]
    UnknownEntity(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Model not fitted")]
    ModelNotFitted,
}

impl From<polars::error::PolarsError> for StockcastError {
    fn from(err: polars::error::PolarsError) -> Self {
        StockcastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for StockcastError {
    fn from(err: serde_json::Error) -> Self {
        StockcastError::ModelLoadError(err.to_string())
    }
}
