//! Anomaly detection for engineered feature rows
//!
//! The pipeline consumes a pre-fitted detector through the narrow
//! [`OutlierPredicate`] contract; the bundled implementation is an
//! isolation forest.

mod isolation_forest;

pub use isolation_forest::{IsolationForest, IsolationTree};

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A pre-fitted row classifier: +1 marks an inlier, -1 an outlier.
///
/// The pipeline only applies the predicate; it never fits or tunes it.
/// Implementations must label rows independently and preserve row order.
pub trait OutlierPredicate {
    /// Label each row of `x` as +1 (inlier) or -1 (outlier)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>>;
}
