//! Isolation Forest outlier detection

use crate::anomaly::OutlierPredicate;
use crate::error::{Result, StockcastError};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Isolation tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IsolationTree {
    /// Internal node with a random split
    Internal {
        /// Feature index for the split
        feature: usize,
        /// Split threshold
        threshold: f64,
        /// Left subtree (values < threshold)
        left: Box<IsolationTree>,
        /// Right subtree (values >= threshold)
        right: Box<IsolationTree>,
    },
    /// External (leaf) node
    External {
        /// Number of samples isolated in this node
        size: usize,
    },
}

impl IsolationTree {
    /// Build a tree over the sampled row indices
    fn build(
        x: &Array2<f64>,
        indices: &[usize],
        height: usize,
        max_height: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let n_samples = indices.len();

        if height >= max_height || n_samples <= 1 {
            return IsolationTree::External { size: n_samples };
        }

        let feature = rng.gen_range(0..x.ncols());

        let values: Vec<f64> = indices.iter().map(|&i| x[[i, feature]]).collect();
        let min_val = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_val = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        // A constant feature cannot split this subset
        if (max_val - min_val).abs() < 1e-10 {
            return IsolationTree::External { size: n_samples };
        }

        let threshold = rng.gen_range(min_val..max_val);

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] < threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            return IsolationTree::External { size: n_samples };
        }

        IsolationTree::Internal {
            feature,
            threshold,
            left: Box::new(Self::build(x, &left_indices, height + 1, max_height, rng)),
            right: Box::new(Self::build(x, &right_indices, height + 1, max_height, rng)),
        }
    }

    /// Path length from the root to the leaf isolating `sample`
    fn path_length(&self, sample: &[f64], current_height: usize) -> f64 {
        match self {
            IsolationTree::External { size } => current_height as f64 + Self::c(*size),
            IsolationTree::Internal {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    left.path_length(sample, current_height + 1)
                } else {
                    right.path_length(sample, current_height + 1)
                }
            }
        }
    }

    /// Average path length of an unsuccessful BST search:
    /// c(n) = 2 * H(n-1) - 2(n-1)/n, H(i) the harmonic number
    fn c(n: usize) -> f64 {
        if n <= 1 {
            0.0
        } else if n == 2 {
            1.0
        } else {
            let n_f = n as f64;
            2.0 * ((n_f - 1.0).ln() + 0.5772156649) - 2.0 * (n_f - 1.0) / n_f
        }
    }
}

/// Isolation forest over engineered feature rows.
///
/// The pipeline deserializes a fitted forest from the model bundle and only
/// calls [`OutlierPredicate::predict`]; `fit` exists for test fixtures and
/// artifact tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Number of trees
    n_estimators: usize,
    /// Maximum samples per tree
    max_samples: usize,
    /// Expected proportion of outliers, used to place the threshold at fit time
    contamination: f64,
    /// Random seed for tree construction
    seed: Option<u64>,
    /// Fitted trees
    trees: Option<Vec<IsolationTree>>,
    /// Decision threshold on the anomaly score
    threshold: Option<f64>,
    /// Samples per tree used at fit time
    n_samples: Option<usize>,
}

impl IsolationForest {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: None,
            trees: None,
            threshold: None,
            n_samples: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n.max(1);
        self
    }

    pub fn with_max_samples(mut self, n: usize) -> Self {
        self.max_samples = n.max(1);
        self
    }

    pub fn with_contamination(mut self, c: f64) -> Self {
        self.contamination = c.clamp(0.0, 0.5);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fit trees and the contamination-based threshold.
    ///
    /// Not called by the pipeline; the bundled forest arrives fitted.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(StockcastError::DataError(
                "cannot fit isolation forest on an empty matrix".to_string(),
            ));
        }
        let samples_per_tree = self.max_samples.min(n_samples);

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let max_height = (samples_per_tree as f64).log2().ceil() as usize;

        let mut trees = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let indices: Vec<usize> = (0..samples_per_tree)
                .map(|_| rng.gen_range(0..n_samples))
                .collect();
            trees.push(IsolationTree::build(x, &indices, 0, max_height, &mut rng));
        }

        self.trees = Some(trees);
        self.n_samples = Some(samples_per_tree);

        // Threshold sits at the contamination quantile of the fit scores
        let scores = self.score_samples(x)?;
        let mut sorted: Vec<f64> = scores.iter().copied().collect();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let idx = ((self.contamination * n_samples as f64) as usize).min(n_samples - 1);
        self.threshold = Some(sorted[idx]);

        Ok(())
    }

    /// Anomaly score per row in [0, 1]; higher is more anomalous
    pub fn score_samples(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let trees = self.trees.as_ref().ok_or(StockcastError::ModelNotFitted)?;

        let c_n = IsolationTree::c(self.n_samples.unwrap_or(256));

        let scores: Vec<f64> = x
            .rows()
            .into_iter()
            .map(|row| {
                let sample: Vec<f64> = row.iter().copied().collect();
                let avg_path: f64 = trees
                    .iter()
                    .map(|tree| tree.path_length(&sample, 0))
                    .sum::<f64>()
                    / trees.len() as f64;

                // s(x, n) = 2^(-E[h(x)] / c(n))
                2.0_f64.powf(-avg_path / c_n)
            })
            .collect();

        Ok(Array1::from_vec(scores))
    }

    /// Decision threshold on the anomaly score
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(0.5)
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlierPredicate for IsolationForest {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<i32>> {
        let scores = self.score_samples(x)?;
        let threshold = self.threshold();

        Ok(scores.mapv(|s| if s >= threshold { -1 } else { 1 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clustered_with_outliers() -> Array2<f64> {
        // 50 points in a tight band plus two far-away rows
        let mut data = Vec::new();
        for i in 0..50 {
            data.push((i % 10) as f64);
            data.push(((i % 10) + 1) as f64);
        }
        data.extend_from_slice(&[100.0, 100.0]);
        data.extend_from_slice(&[-50.0, -50.0]);
        Array2::from_shape_vec((52, 2), data).unwrap()
    }

    #[test]
    fn test_outliers_score_higher() {
        let x = clustered_with_outliers();

        let mut forest = IsolationForest::new()
            .with_n_estimators(50)
            .with_contamination(0.05)
            .with_seed(42);
        forest.fit(&x).unwrap();

        let scores = forest.score_samples(&x).unwrap();
        assert!(scores[50] > scores[0]);
        assert!(scores[51] > scores[0]);

        let labels = forest.predict(&x).unwrap();
        let n_outliers = labels.iter().filter(|&&l| l == -1).count();
        assert!(n_outliers > 0);
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let forest = IsolationForest::new();
        let x = Array2::zeros((3, 2));
        let err = forest.predict(&x).unwrap_err();
        assert!(matches!(err, StockcastError::ModelNotFitted));
    }

    #[test]
    fn test_fitted_forest_serde_round_trip() {
        let x = clustered_with_outliers();
        let mut forest = IsolationForest::new().with_n_estimators(20).with_seed(7);
        forest.fit(&x).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: IsolationForest = serde_json::from_str(&json).unwrap();

        // The deserialized forest is the same predicate
        let before = forest.predict(&x).unwrap();
        let after = restored.predict(&x).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_fit_rejected() {
        let mut forest = IsolationForest::new();
        let x = Array2::zeros((0, 2));
        assert!(forest.fit(&x).is_err());
    }
}
