//! CSV loading for price history tables

use crate::data::DATE_COL;
use crate::error::{Result, StockcastError};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the raw price history from a delimited file
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    /// Create a loader for the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this loader reads from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file into a DataFrame.
    ///
    /// The file must exist and parse as headered CSV; no validation beyond
    /// parsing happens here (see [`crate::data::validate_frame`]).
    pub fn load(&self) -> Result<DataFrame> {
        if !self.path.exists() {
            return Err(StockcastError::NotFound(self.path.display().to_string()));
        }

        let file = File::open(&self.path)?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| {
                StockcastError::DataError(format!("failed to parse {}: {}", self.path.display(), e))
            })?;

        info!(
            path = %self.path.display(),
            rows = df.height(),
            cols = df.width(),
            "dataset loaded"
        );

        Ok(df)
    }
}

/// Parse the date column and sort the table by it.
///
/// The sort is stable: rows sharing a date keep their relative order, which
/// preserves per-ticker ordering for same-day observations. Dates already
/// parsed by schema inference are left as-is.
pub fn prepare_time_index(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;

    let column = df.column(DATE_COL).map_err(|_| {
        StockcastError::ValidationError(format!("missing required columns: {}", DATE_COL))
    })?;
    let series = column.as_materialized_series().clone();

    match series.dtype() {
        DataType::Date => {}
        DataType::String => {
            let parsed = series
                .str()
                .map_err(|e| StockcastError::DataError(e.to_string()))?
                .as_date(None, false)
                .map_err(|e| {
                    StockcastError::DataError(format!("cannot parse {} as dates: {}", DATE_COL, e))
                })?
                .into_series();
            df.replace(DATE_COL, parsed)?;
        }
        other => {
            return Err(StockcastError::DataError(format!(
                "column {} has dtype {:?}, expected a date or date string",
                DATE_COL, other
            )));
        }
    }

    let sorted = df.sort(
        [DATE_COL],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_load_csv() {
        let file = write_csv(&[
            "Stock_Name,Date,Close",
            "AAPL,2024-01-02,185.5",
            "AAPL,2024-01-03,184.2",
            "MSFT,2024-01-02,370.0",
        ]);

        let loader = CsvLoader::new(file.path());
        let df = loader.load().unwrap();

        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let loader = CsvLoader::new("/nonexistent/prices.csv");
        let err = loader.load().unwrap_err();
        assert!(matches!(err, StockcastError::NotFound(_)));
        assert!(err.to_string().contains("prices.csv"));
    }

    #[test]
    fn test_prepare_parses_dates_and_sorts() {
        let file = write_csv(&[
            "Stock_Name,Date,Close",
            "AAPL,2024-01-05,3.0",
            "AAPL,2024-01-02,1.0",
            "AAPL,2024-01-03,2.0",
        ]);

        let df = CsvLoader::new(file.path()).load().unwrap();
        let sorted = prepare_time_index(df).unwrap();

        assert_eq!(sorted.column(DATE_COL).unwrap().dtype(), &DataType::Date);
        let closes: Vec<f64> = sorted
            .column("Close")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_prepare_is_stable_within_a_date() {
        let file = write_csv(&[
            "Stock_Name,Date,Close",
            "AAPL,2024-01-02,1.0",
            "MSFT,2024-01-02,10.0",
            "AAPL,2024-01-03,2.0",
            "MSFT,2024-01-03,11.0",
        ]);

        let df = CsvLoader::new(file.path()).load().unwrap();
        let sorted = prepare_time_index(df).unwrap();

        let names: Vec<String> = sorted
            .column("Stock_Name")
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["AAPL", "MSFT", "AAPL", "MSFT"]);
    }

    #[test]
    fn test_unparseable_dates_error() {
        let file = write_csv(&["Stock_Name,Date,Close", "AAPL,not-a-date,1.0"]);

        let df = CsvLoader::new(file.path()).load().unwrap();
        let err = prepare_time_index(df).unwrap_err();
        assert!(matches!(err, StockcastError::DataError(_)));
    }
}
