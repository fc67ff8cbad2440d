//! Pre-fitted feature and target scaling

use crate::error::{Result, StockcastError};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Affine parameters for one feature column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnScale {
    /// Column name at fit time
    pub column: String,
    /// Subtracted center (mean, min, or median depending on the fit)
    pub center: f64,
    /// Divisor (std, range, or IQR depending on the fit); never zero
    pub scale: f64,
}

/// Pre-fitted per-column scaler over a fixed, ordered column set.
///
/// The fit-time column order is part of the model contract: `transform`
/// refuses a table whose column names or order differ, rather than
/// truncating or reordering into silently wrong numerics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureScaler {
    columns: Vec<ColumnScale>,
}

impl FeatureScaler {
    /// Create a scaler from fit-time parameters, in fit order
    pub fn new(columns: Vec<ColumnScale>) -> Self {
        Self { columns }
    }

    /// Column names the scaler was fit on, in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.column.as_str()).collect()
    }

    fn check_schema(&self, df: &DataFrame) -> Result<()> {
        let actual: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        let expected = self.column_names();
        if actual != expected {
            return Err(StockcastError::SchemaMismatch {
                expected: format!("columns [{}]", expected.join(", ")),
                actual: format!("columns [{}]", actual.join(", ")),
            });
        }
        Ok(())
    }

    /// Scale every column in place: (x - center) / scale.
    ///
    /// Returns a table with identical shape, column names, and row order.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_schema(df)?;
        let out = self.apply(df, |v, p| (v - p.center) / p.scale)?;
        info!(rows = out.height(), cols = out.width(), "feature scaling completed");
        Ok(out)
    }

    /// Undo [`FeatureScaler::transform`]: x * scale + center
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_schema(df)?;
        self.apply(df, |v, p| v * p.scale + p.center)
    }

    fn apply(&self, df: &DataFrame, op: impl Fn(f64, &ColumnScale) -> f64) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len());

        for params in &self.columns {
            let ca = df
                .column(&params.column)?
                .f64()
                .map_err(|e| StockcastError::DataError(e.to_string()))?;

            let scaled: Float64Chunked = ca.into_iter().map(|opt| opt.map(|v| op(v, params))).collect();
            columns.push(scaled.with_name(params.column.as_str().into()).into_series().into());
        }

        DataFrame::new(columns).map_err(Into::into)
    }
}

/// Pre-fitted scalar transform for the prediction target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetScaler {
    pub center: f64,
    pub scale: f64,
}

impl TargetScaler {
    /// Scale target values into the model's training range
    pub fn transform(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|v| (v - self.center) / self.scale)
    }

    /// Map model outputs back into price units
    pub fn inverse_transform(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|v| v * self.scale + self.center)
    }
}
