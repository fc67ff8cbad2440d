//! Raw data loading and validation
//!
//! Provides CSV ingestion into a [`polars`] DataFrame, schema/quality
//! validation, and the canonical raw column names the rest of the pipeline
//! builds on.

mod loader;
mod validation;

pub use loader::{prepare_time_index, CsvLoader};
pub use validation::{validate_frame, ColumnMissing, ValidationReport};

/// Ticker identifier column in the raw file
pub const ENTITY_COL: &str = "Stock_Name";

/// Observation date column in the raw file
pub const DATE_COL: &str = "Date";

/// Closing price column in the raw file
pub const CLOSE_COL: &str = "Close";
