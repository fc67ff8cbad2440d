//! Batch pipeline driver

use super::{OutlierFilter, PredictionAdapter, StageTimer};
use crate::config::PipelineConfig;
use crate::data::{prepare_time_index, validate_frame, CsvLoader};
use crate::error::{Result, StockcastError};
use crate::features::{select_features, FeatureEngine, PipelineMode, TARGET_COL};
use crate::model::ModelBundle;
use polars::prelude::*;
use tracing::info;

/// Outcome of a pipeline run
#[derive(Debug, Clone)]
pub struct PredictionReport {
    /// Predicted next-period closes, in price units, one per surviving row
    pub predictions: Vec<f64>,
    /// Observed next-period closes, aligned with `predictions`
    /// (training mode only)
    pub targets: Option<Vec<f64>>,
    /// Rows in the raw table
    pub rows_loaded: usize,
    /// Rows surviving feature engineering, vocabulary filter, and null drop
    pub rows_featured: usize,
    /// Rows dropped by the outlier filter
    pub outliers_removed: usize,
}

/// Owns one batch run end to end.
///
/// Every invocation is a fresh job over its own table; stages execute
/// sequentially and each one logs its elapsed time through [`StageTimer`].
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    bundle: ModelBundle,
}

impl Pipeline {
    /// Build a pipeline from an already-loaded bundle
    pub fn new(config: PipelineConfig, bundle: ModelBundle) -> Self {
        Self { config, bundle }
    }

    /// Load the model bundle named by the configuration
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let bundle = {
            let _timer = StageTimer::start("load_model");
            ModelBundle::load(&config.data.model_file)?
        };
        Ok(Self::new(config, bundle))
    }

    /// Read-only access to the loaded bundle
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Run the full batch: load, engineer, filter, scale, predict.
    pub fn run(&self, mode: PipelineMode) -> Result<PredictionReport> {
        let raw = self.load_data()?;
        let rows_loaded = raw.height();

        let engineered = {
            let _timer = StageTimer::start("feature_engineering");
            let engine = FeatureEngine::new(self.config.features.clone());
            engine.transform(raw, self.bundle.label_encoder.classes(), mode)?
        };
        let rows_featured = engineered.height();

        // Targets ride alongside the feature table from here on; every
        // later row drop must be mirrored onto them.
        let mut targets = match mode {
            PipelineMode::Training => Some(
                engineered
                    .column(TARGET_COL)?
                    .f64()
                    .map_err(|e| StockcastError::DataError(e.to_string()))?
                    .into_no_null_iter()
                    .collect::<Vec<f64>>(),
            ),
            PipelineMode::Inference => None,
        };

        let features = {
            let _timer = StageTimer::start("feature_selection");
            let encoded = self.bundle.label_encoder.encode_column(&engineered)?;
            select_features(&encoded, &self.config.features.feature_cols)?
        };

        let verdict = {
            let _timer = StageTimer::start("outlier_removal");
            OutlierFilter::new(&self.bundle.isolation_forest).apply(&features)?
        };

        if let Some(values) = targets.take() {
            targets = Some(
                values
                    .into_iter()
                    .zip(verdict.keep_mask.iter())
                    .filter_map(|(v, &keep)| keep.then_some(v))
                    .collect(),
            );
        }

        let scaled = {
            let _timer = StageTimer::start("feature_scaling");
            self.bundle.scaler_x.transform(&verdict.inliers)?
        };

        let predictions = {
            let _timer = StageTimer::start("prediction");
            let adapter = PredictionAdapter::new(&self.bundle.model, &self.bundle.scaler_y);
            adapter.predict(&scaled)?
        };

        info!(
            rows_loaded,
            rows_featured,
            outliers_removed = verdict.removed,
            predictions = predictions.len(),
            "pipeline run completed"
        );

        Ok(PredictionReport {
            predictions: predictions.to_vec(),
            targets,
            rows_loaded,
            rows_featured,
            outliers_removed: verdict.removed,
        })
    }

    /// Load, validate, and time-index the raw table
    fn load_data(&self) -> Result<DataFrame> {
        let _timer = StageTimer::start("load_data");

        let loader = CsvLoader::new(&self.config.data.input_file);
        let df = loader.load()?;

        let report = validate_frame(
            &df,
            &self.config.validation.required_columns,
            self.config.validation.max_missing_threshold,
        )?;
        info!(
            rows = report.num_rows,
            cols = report.num_columns,
            "raw data validated"
        );

        prepare_time_index(df)
    }
}
