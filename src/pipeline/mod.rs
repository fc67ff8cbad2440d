//! Pipeline stages and the batch driver
//!
//! Each stage takes and returns an explicit table value; the driver chains
//! them in order and a scoped timer logs every stage's elapsed time.

mod driver;
mod outlier;
mod predictor;
mod timing;

pub use driver::{Pipeline, PredictionReport};
pub use outlier::{OutlierFilter, OutlierVerdict};
pub use predictor::PredictionAdapter;
pub use timing::StageTimer;

use crate::error::{Result, StockcastError};
use ndarray::Array2;
use polars::prelude::*;

/// Convert a numeric-only table into a row-major matrix, column order
/// preserved.
///
/// Nulls are rejected rather than coerced: by the time a table reaches a
/// matrix-consuming stage, the null drop has already happened, so a null
/// here means a wiring bug that would otherwise corrupt predictions.
pub(crate) fn to_feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();

    let mut col_data: Vec<Vec<f64>> = Vec::with_capacity(n_cols);
    for column in df.get_columns() {
        if column.null_count() > 0 {
            return Err(StockcastError::DataError(format!(
                "column {} still contains nulls at matrix conversion",
                column.name()
            )));
        }
        let values: Vec<f64> = column
            .cast(&DataType::Float64)
            .map_err(|e| StockcastError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| StockcastError::DataError(e.to_string()))?
            .into_no_null_iter()
            .collect();
        col_data.push(values);
    }

    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_data[c][r]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_row_major_order() {
        let df = df!("a" => &[1.0, 2.0], "b" => &[10.0, 20.0]).unwrap();

        let x = to_feature_matrix(&df).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(x[[0, 0]], 1.0);
        assert_eq!(x[[0, 1]], 10.0);
        assert_eq!(x[[1, 0]], 2.0);
        assert_eq!(x[[1, 1]], 20.0);
    }

    #[test]
    fn test_nulls_rejected() {
        let df = df!("a" => &[Some(1.0), None]).unwrap();

        let err = to_feature_matrix(&df).unwrap_err();
        match err {
            StockcastError::DataError(msg) => assert!(msg.contains("a")),
            other => panic!("expected DataError, got {:?}", other),
        }
    }
}
