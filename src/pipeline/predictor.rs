//! Prediction over scaled features

use super::to_feature_matrix;
use crate::error::Result;
use crate::model::{LinearRegression, TargetScaler};
use ndarray::Array1;
use polars::prelude::*;
use tracing::info;

/// Applies the bundled regressor and maps outputs back to price units.
///
/// Predictions come out one per input row, in input row order. The target
/// scaler's inverse is applied after prediction, never before.
pub struct PredictionAdapter<'a> {
    model: &'a LinearRegression,
    target_scaler: &'a TargetScaler,
}

impl<'a> PredictionAdapter<'a> {
    pub fn new(model: &'a LinearRegression, target_scaler: &'a TargetScaler) -> Self {
        Self {
            model,
            target_scaler,
        }
    }

    /// Predict next-period closes, in original price units
    pub fn predict(&self, scaled: &DataFrame) -> Result<Array1<f64>> {
        let x = to_feature_matrix(scaled)?;
        let raw = self.model.predict(&x)?;
        let predictions = self.target_scaler.inverse_transform(&raw);

        info!(rows = predictions.len(), "prediction completed");
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StockcastError;
    use ndarray::array;

    #[test]
    fn test_predict_inverse_scales_after_model() {
        let model = LinearRegression {
            coefficients: array![1.0, 1.0],
            intercept: 0.0,
        };
        // Model output 3.0 for each row; price units: 3 * 10 + 100 = 130
        let target_scaler = TargetScaler {
            center: 100.0,
            scale: 10.0,
        };

        let df = df!("a" => &[1.0, 2.0], "b" => &[2.0, 1.0]).unwrap();
        let adapter = PredictionAdapter::new(&model, &target_scaler);
        let preds = adapter.predict(&df).unwrap();

        assert_eq!(preds.len(), 2);
        assert!((preds[0] - 130.0).abs() < 1e-12);
        assert!((preds[1] - 130.0).abs() < 1e-12);
    }

    #[test]
    fn test_row_order_preserved() {
        let model = LinearRegression {
            coefficients: array![1.0],
            intercept: 0.0,
        };
        let target_scaler = TargetScaler {
            center: 0.0,
            scale: 1.0,
        };

        let df = df!("a" => &[3.0, 1.0, 2.0]).unwrap();
        let preds = PredictionAdapter::new(&model, &target_scaler)
            .predict(&df)
            .unwrap();

        assert_eq!(preds, array![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_width_mismatch_aborts() {
        let model = LinearRegression {
            coefficients: array![1.0, 2.0, 3.0],
            intercept: 0.0,
        };
        let target_scaler = TargetScaler {
            center: 0.0,
            scale: 1.0,
        };

        let df = df!("a" => &[1.0], "b" => &[2.0]).unwrap();
        let err = PredictionAdapter::new(&model, &target_scaler)
            .predict(&df)
            .unwrap_err();
        assert!(matches!(err, StockcastError::SchemaMismatch { .. }));
    }
}
