//! Time-series feature engineering
//!
//! Builds the lag, rolling-window, and trend columns the prediction model
//! was trained on. All windowed computation is partitioned per ticker and
//! aligned back to the original row order, so one ticker's history never
//! leaks into another's features.

mod engine;

pub use engine::FeatureEngine;

use crate::error::{Result, StockcastError};
use polars::prelude::*;

/// Whether a run computes the training target
///
/// Training computes `target` (next-period close) and drops rows without a
/// future value; inference never materializes the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Training,
    Inference,
}

/// Next-period close column, present in training mode only
pub const TARGET_COL: &str = "target";

/// Per-ticker price delta column
pub const PRICE_CHANGE_COL: &str = "Price_Change";

/// Per-ticker relative price delta column
pub const PRICE_CHANGE_PCT_COL: &str = "Price_Change_Percentage";

/// Binary up-trend flag column
pub const PRICE_TREND_COL: &str = "Price_Trend";

/// Encoded ticker column added by the entity encoder
pub const ENTITY_ENCODED_COL: &str = "Stock_encoded";

/// Project the model's feature columns, in order, cast to f64.
///
/// The model was fit on an exact column set and order; anything less is an
/// `InvalidSchema` failure naming the first absent column. Callers must run
/// the feature engine (and entity encoder) first.
pub fn select_features(df: &DataFrame, feature_cols: &[String]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(feature_cols.len());

    for name in feature_cols {
        let column = df
            .column(name)
            .map_err(|_| StockcastError::InvalidSchema(name.clone()))?;
        let cast = column
            .cast(&DataType::Float64)
            .map_err(|e| StockcastError::DataError(format!("cannot cast {} to f64: {}", name, e)))?;
        columns.push(cast);
    }

    DataFrame::new(columns).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_features_preserves_order() {
        let df = df!(
            "b" => &[2.0, 20.0],
            "a" => &[1.0, 10.0],
            "Price_Trend" => &[1i64, 0]
        )
        .unwrap();

        let cols = vec!["a".to_string(), "Price_Trend".to_string(), "b".to_string()];
        let selected = select_features(&df, &cols).unwrap();

        let names: Vec<String> = selected
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["a", "Price_Trend", "b"]);
        // Integer trend column comes out as f64
        assert_eq!(selected.column("Price_Trend").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_select_features_missing_column() {
        let df = df!("a" => &[1.0]).unwrap();

        let cols = vec!["a".to_string(), "rolling_mean_3".to_string()];
        let err = select_features(&df, &cols).unwrap_err();
        match err {
            StockcastError::InvalidSchema(name) => assert_eq!(name, "rolling_mean_3"),
            other => panic!("expected InvalidSchema, got {:?}", other),
        }
    }
}
