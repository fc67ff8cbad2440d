//! Frozen ticker label encoding

use crate::data::ENTITY_COL;
use crate::error::{Result, StockcastError};
use crate::features::ENTITY_ENCODED_COL;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Maps ticker names to the integer codes the model was trained with.
///
/// The class list is fixed at training time; this encoder never learns new
/// tickers. Callers filter to [`LabelEncoder::classes`] before encoding;
/// an out-of-vocabulary ticker reaching `encode` is a programming error
/// surfaced as [`StockcastError::UnknownEntity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Create an encoder over a fixed, ordered class list
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// The trained vocabulary, in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code for a single ticker
    pub fn encode(&self, name: &str) -> Result<i64> {
        self.classes
            .iter()
            .position(|c| c == name)
            .map(|i| i as i64)
            .ok_or_else(|| StockcastError::UnknownEntity(name.to_string()))
    }

    /// Append the encoded ticker column to a table.
    ///
    /// Reads the ticker column and writes its integer codes alongside as
    /// `Stock_encoded`, leaving every other column untouched.
    pub fn encode_column(&self, df: &DataFrame) -> Result<DataFrame> {
        let index: HashMap<&str, i64> = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i as i64))
            .collect();

        let entities = df
            .column(ENTITY_COL)
            .map_err(|_| StockcastError::InvalidSchema(ENTITY_COL.to_string()))?
            .str()
            .map_err(|e| StockcastError::DataError(e.to_string()))?;

        let codes: Vec<i64> = entities
            .into_iter()
            .map(|v| match v {
                Some(name) => index
                    .get(name)
                    .copied()
                    .ok_or_else(|| StockcastError::UnknownEntity(name.to_string())),
                None => Err(StockcastError::UnknownEntity("<null>".to_string())),
            })
            .collect::<Result<Vec<i64>>>()?;

        let mut out = df.clone();
        out.with_column(Series::new(ENTITY_ENCODED_COL.into(), codes))?;

        info!(rows = out.height(), "ticker encoding completed");
        Ok(out)
    }
}
