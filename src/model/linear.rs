//! Pre-fitted linear regression

use crate::error::{Result, StockcastError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A fitted linear regressor: coefficients and intercept only.
///
/// The pipeline treats this as an opaque feature-vector-to-scalar function;
/// fitting happened elsewhere and the parameters arrive via the model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients, one per feature column in schema order
    pub coefficients: Array1<f64>,
    /// Fitted intercept (bias)
    pub intercept: f64,
}

impl LinearRegression {
    /// Number of features the model was fit on
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per row of `x`, preserving row order.
    ///
    /// The matrix width must equal the fitted coefficient count; anything
    /// else would silently misalign features against weights.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coefficients.len() {
            return Err(StockcastError::SchemaMismatch {
                expected: format!("{} feature columns", self.coefficients.len()),
                actual: format!("{} feature columns", x.ncols()),
            });
        }

        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}
