//! Raw-table validation
//!
//! Checks the loaded table against the configured schema requirements before
//! any feature work happens: required columns must exist, and no required
//! column may exceed the missing-value threshold. Failures name the exact
//! offending columns.

use crate::error::{Result, StockcastError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Missing-value ratio for a single required column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub ratio: f64,
}

/// Result of validating a raw table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub num_rows: usize,
    pub num_columns: usize,
    /// Per required column, the proportion of null values
    pub missing: Vec<ColumnMissing>,
}

/// Validate a DataFrame against required columns and a missing-value threshold.
///
/// Returns a report on success. Missing columns and columns above the
/// threshold are both fatal, with every offending column named in the error.
pub fn validate_frame(
    df: &DataFrame,
    required_columns: &[String],
    max_missing_threshold: f64,
) -> Result<ValidationReport> {
    let present: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();

    let missing_cols: Vec<String> = required_columns
        .iter()
        .filter(|c| !present.contains(&c.as_str()))
        .cloned()
        .collect();

    if !missing_cols.is_empty() {
        return Err(StockcastError::ValidationError(format!(
            "missing required columns: {}",
            missing_cols.join(", ")
        )));
    }

    let num_rows = df.height();
    let mut missing = Vec::with_capacity(required_columns.len());
    let mut over_threshold = Vec::new();

    for col_name in required_columns {
        let column = df.column(col_name)?;
        let ratio = if num_rows > 0 {
            column.null_count() as f64 / num_rows as f64
        } else {
            0.0
        };

        if ratio > max_missing_threshold {
            over_threshold.push(format!("{} ({:.1}% missing)", col_name, ratio * 100.0));
        }

        missing.push(ColumnMissing {
            column: col_name.clone(),
            ratio,
        });
    }

    if !over_threshold.is_empty() {
        return Err(StockcastError::ValidationError(format!(
            "columns exceeding missing-value threshold {}: {}",
            max_missing_threshold,
            over_threshold.join(", ")
        )));
    }

    Ok(ValidationReport {
        num_rows,
        num_columns: df.width(),
        missing,
    })
}
