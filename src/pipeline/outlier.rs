//! Outlier row removal

use super::to_feature_matrix;
use crate::anomaly::OutlierPredicate;
use crate::error::Result;
use polars::prelude::*;
use tracing::info;

/// Result of applying the outlier predicate to a table
pub struct OutlierVerdict {
    /// Rows the predicate labeled +1
    pub inliers: DataFrame,
    /// Number of rows removed
    pub removed: usize,
    /// Per-row keep decision, in input row order; lets callers filter
    /// auxiliary vectors (e.g. training targets) the same way
    pub keep_mask: Vec<bool>,
}

/// Applies a pre-fitted anomaly predicate and drops flagged rows.
///
/// The predicate is opaque: this component only partitions rows by its
/// labels and reports how many were removed.
pub struct OutlierFilter<'a> {
    predicate: &'a dyn OutlierPredicate,
}

impl<'a> OutlierFilter<'a> {
    pub fn new(predicate: &'a dyn OutlierPredicate) -> Self {
        Self { predicate }
    }

    /// Partition a numeric feature table into inliers and discarded rows
    pub fn apply(&self, df: &DataFrame) -> Result<OutlierVerdict> {
        let x = to_feature_matrix(df)?;
        let labels = self.predicate.predict(&x)?;

        let keep_mask: Vec<bool> = labels.iter().map(|&l| l == 1).collect();
        let removed = keep_mask.iter().filter(|&&k| !k).count();

        let mask: BooleanChunked = keep_mask.iter().map(|&k| Some(k)).collect();
        let inliers = df.filter(&mask)?;

        info!(
            removed,
            kept = inliers.height(),
            "outlier removal completed"
        );

        Ok(OutlierVerdict {
            inliers,
            removed,
            keep_mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use ndarray::{Array1, Array2};

    /// Deterministic predicate flagging fixed row indices as outliers
    struct FixedOutliers(Vec<usize>);

    impl OutlierPredicate for FixedOutliers {
        fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
            Ok(Array1::from_iter(
                (0..x.nrows()).map(|i| if self.0.contains(&i) { -1 } else { 1 }),
            ))
        }
    }

    #[test]
    fn test_flagged_rows_removed() {
        let df = df!(
            "a" => &[1.0, 2.0, 300.0, 4.0],
            "b" => &[1.0, 1.0, 1.0, 1.0]
        )
        .unwrap();

        let predicate = FixedOutliers(vec![2]);
        let verdict = OutlierFilter::new(&predicate).apply(&df).unwrap();

        assert_eq!(verdict.removed, 1);
        assert_eq!(verdict.inliers.height(), 3);
        assert_eq!(verdict.keep_mask, vec![true, true, false, true]);

        let a: Vec<f64> = verdict
            .inliers
            .column("a")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(a, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_no_outliers_is_identity() {
        let df = df!("a" => &[1.0, 2.0]).unwrap();

        let predicate = FixedOutliers(vec![]);
        let verdict = OutlierFilter::new(&predicate).apply(&df).unwrap();

        assert_eq!(verdict.removed, 0);
        assert!(verdict.inliers.equals(&df));
    }

    #[test]
    fn test_empty_table() {
        let df = df!("a" => &Vec::<f64>::new()).unwrap();

        let predicate = FixedOutliers(vec![]);
        let verdict = OutlierFilter::new(&predicate).apply(&df).unwrap();
        assert_eq!(verdict.removed, 0);
        assert_eq!(verdict.inliers.height(), 0);
    }
}
