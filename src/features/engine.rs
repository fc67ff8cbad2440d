//! Per-ticker feature computation

use super::{
    PipelineMode, PRICE_CHANGE_COL, PRICE_CHANGE_PCT_COL, PRICE_TREND_COL, TARGET_COL,
};
use crate::config::FeatureConfig;
use crate::data::{CLOSE_COL, ENTITY_COL};
use crate::error::{Result, StockcastError};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Engineers lag, rolling, and trend features per ticker.
///
/// Every derived column is computed over one ticker's rows in time order and
/// written back at the original row positions, leaving the table's row order
/// untouched until the final vocabulary filter and null drop.
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    /// Create an engine with the given spans and lags
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Run feature engineering over a date-sorted table.
    ///
    /// Appends, per span `i`: `lag_i`, `rolling_mean_i`, and (for `i` > 1)
    /// `rolling_std_i`; then the price-change family and, in training mode,
    /// the `target` column. Rows for tickers outside `vocabulary` are
    /// dropped, then any row still carrying a null (insufficient trailing
    /// history, missing close, or no future value for the target) is
    /// removed rather than imputed.
    pub fn transform(
        &self,
        df: DataFrame,
        vocabulary: &[String],
        mode: PipelineMode,
    ) -> Result<DataFrame> {
        let mut df = df;
        let n = df.height();

        let entities: Vec<Option<String>> = df
            .column(ENTITY_COL)
            .map_err(|_| StockcastError::InvalidSchema(ENTITY_COL.to_string()))?
            .str()
            .map_err(|e| StockcastError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();

        let closes: Vec<Option<f64>> = df
            .column(CLOSE_COL)
            .map_err(|_| StockcastError::InvalidSchema(CLOSE_COL.to_string()))?
            .cast(&DataType::Float64)
            .map_err(|e| StockcastError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| StockcastError::DataError(e.to_string()))?
            .into_iter()
            .collect();

        let groups = group_rows(&entities);
        debug!(rows = n, tickers = groups.len(), "feature engineering started");

        // Lag and rolling-window columns per span
        for &span in &self.config.time_spans {
            let mut lag = vec![None; n];
            let mut mean = vec![None; n];
            let mut std = vec![None; n];

            for rows in groups.values() {
                for (pos, &row) in rows.iter().enumerate() {
                    if pos >= span {
                        lag[row] = closes[rows[pos - span]];
                    }
                    if pos + 1 >= span {
                        let window: Option<Vec<f64>> = rows[pos + 1 - span..=pos]
                            .iter()
                            .map(|&r| closes[r])
                            .collect();
                        if let Some(values) = window {
                            mean[row] = Some(values.iter().sum::<f64>() / span as f64);
                            if span > 1 {
                                std[row] = Some(sample_std(&values));
                            }
                        }
                    }
                }
            }

            df.with_column(Series::new(format!("lag_{}", span).into(), lag))?;
            df.with_column(Series::new(format!("rolling_mean_{}", span).into(), mean))?;
            // A single-point standard deviation is undefined; the column is
            // never produced for span 1.
            if span > 1 {
                df.with_column(Series::new(format!("rolling_std_{}", span).into(), std))?;
            }
        }

        // Price-change family
        let mut price_change = vec![None; n];
        let mut price_change_pct = vec![None; n];
        for rows in groups.values() {
            for (pos, &row) in rows.iter().enumerate() {
                if pos >= 1 {
                    if let (Some(curr), Some(prev)) = (closes[row], closes[rows[pos - 1]]) {
                        price_change[row] = Some(curr - prev);
                        price_change_pct[row] = Some((curr - prev) / prev);
                    }
                }
            }
        }

        // Strictly positive change maps to 1; zero, negative, and undefined
        // all map to 0.
        let trend: Vec<i64> = price_change
            .iter()
            .map(|pc| match pc {
                Some(v) if *v > 0.0 => 1,
                _ => 0,
            })
            .collect();

        df.with_column(Series::new(PRICE_CHANGE_COL.into(), price_change.clone()))?;
        df.with_column(Series::new(PRICE_CHANGE_PCT_COL.into(), price_change_pct))?;
        df.with_column(Series::new(PRICE_TREND_COL.into(), trend))?;

        for &lag_n in &self.config.price_change_lags {
            let mut lagged = vec![None; n];
            for rows in groups.values() {
                for (pos, &row) in rows.iter().enumerate() {
                    if pos >= lag_n {
                        lagged[row] = price_change[rows[pos - lag_n]];
                    }
                }
            }
            df.with_column(Series::new(format!("price_change_lag{}", lag_n).into(), lagged))?;
        }

        if mode == PipelineMode::Training {
            let mut target = vec![None; n];
            for rows in groups.values() {
                for (pos, &row) in rows.iter().enumerate() {
                    if pos + 1 < rows.len() {
                        target[row] = closes[rows[pos + 1]];
                    }
                }
            }
            df.with_column(Series::new(TARGET_COL.into(), target))?;
        }

        let filtered = filter_vocabulary(&df, &entities, vocabulary)?;
        let complete = drop_null_rows(&filtered)?;

        info!(
            rows_in = n,
            rows_out = complete.height(),
            cols = complete.width(),
            "feature engineering completed"
        );

        Ok(complete)
    }
}

/// Sample standard deviation (ddof = 1); callers guarantee at least two values
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Row indices per ticker, in table order
fn group_rows(entities: &[Option<String>]) -> HashMap<&str, Vec<usize>> {
    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, entity) in entities.iter().enumerate() {
        if let Some(name) = entity {
            groups.entry(name.as_str()).or_default().push(row);
        }
    }
    groups
}

/// Keep only rows whose ticker is in the trained vocabulary
fn filter_vocabulary(
    df: &DataFrame,
    entities: &[Option<String>],
    vocabulary: &[String],
) -> Result<DataFrame> {
    let known: HashSet<&str> = vocabulary.iter().map(|s| s.as_str()).collect();
    let mask: BooleanChunked = entities
        .iter()
        .map(|e| Some(e.as_deref().map_or(false, |name| known.contains(name))))
        .collect();

    df.filter(&mask).map_err(Into::into)
}

/// Drop every row carrying a null in any column
fn drop_null_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut mask: Option<BooleanChunked> = None;
    for column in df.get_columns() {
        let not_null = column.as_materialized_series().is_not_null();
        mask = Some(match mask {
            Some(acc) => &acc & &not_null,
            None => not_null,
        });
    }

    match mask {
        Some(mask) => df.filter(&mask).map_err(Into::into),
        None => Ok(df.clone()),
    }
}
