//! Model artifact bundle

use crate::anomaly::IsolationForest;
use crate::error::{Result, StockcastError};
use crate::model::{FeatureScaler, LabelEncoder, LinearRegression, TargetScaler};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Component names the artifact must carry
const REQUIRED_COMPONENTS: [&str; 5] = [
    "model",
    "label_encoder",
    "scaler_x",
    "scaler_y",
    "isolation_forest",
];

/// The five pre-fitted components a prediction run needs.
///
/// Serialized as a single JSON document; every component is named so a
/// broken artifact reports exactly what is missing instead of failing on
/// the first absent field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Primary regressor: scaled feature vector -> scaled target
    pub model: LinearRegression,
    /// Frozen ticker vocabulary and codes
    pub label_encoder: LabelEncoder,
    /// Feature scaler, fit on the model's input columns in order
    pub scaler_x: FeatureScaler,
    /// Target scaler, inverted after prediction
    pub scaler_y: TargetScaler,
    /// Pre-fitted outlier detector
    pub isolation_forest: IsolationForest,
}

/// Inventory of a loaded bundle
#[derive(Debug, Clone, Serialize)]
pub struct BundleSummary {
    pub components: Vec<String>,
    pub n_features: usize,
    pub vocabulary_size: usize,
}

impl ModelBundle {
    /// Load and validate a bundle from a JSON artifact.
    ///
    /// Component presence is checked before deserialization so the error
    /// can list every absent component at once.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StockcastError::NotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let value: serde_json::Value =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                StockcastError::ModelLoadError(format!(
                    "corrupt model artifact {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let object = value.as_object().ok_or_else(|| {
            StockcastError::ModelLoadError(format!(
                "model artifact {} is not a JSON object",
                path.display()
            ))
        })?;

        let missing: Vec<&str> = REQUIRED_COMPONENTS
            .iter()
            .filter(|name| !object.contains_key(**name))
            .copied()
            .collect();

        if !missing.is_empty() {
            return Err(StockcastError::ModelLoadError(format!(
                "missing required model components: {}",
                missing.join(", ")
            )));
        }

        let bundle: ModelBundle = serde_json::from_value(value).map_err(|e| {
            StockcastError::ModelLoadError(format!("failed to deserialize components: {}", e))
        })?;

        info!(
            path = %path.display(),
            n_features = bundle.model.n_features(),
            vocabulary_size = bundle.label_encoder.classes().len(),
            "model bundle loaded"
        );

        Ok(bundle)
    }

    /// Write the bundle as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            StockcastError::ModelLoadError(format!("failed to serialize bundle: {}", e))
        })
    }

    /// Component inventory for logging and the `info` command
    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            components: REQUIRED_COMPONENTS.iter().map(|s| s.to_string()).collect(),
            n_features: self.model.n_features(),
            vocabulary_size: self.label_encoder.classes().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnScale;
    use ndarray::array;
    use std::io::Write;

    fn fixture_bundle() -> ModelBundle {
        ModelBundle {
            model: LinearRegression {
                coefficients: array![1.0, -2.0],
                intercept: 0.1,
            },
            label_encoder: LabelEncoder::new(vec!["AAPL".to_string(), "MSFT".to_string()]),
            scaler_x: FeatureScaler::new(vec![
                ColumnScale {
                    column: "a".to_string(),
                    center: 0.0,
                    scale: 1.0,
                },
                ColumnScale {
                    column: "b".to_string(),
                    center: 1.0,
                    scale: 2.0,
                },
            ]),
            scaler_y: TargetScaler {
                center: 100.0,
                scale: 10.0,
            },
            isolation_forest: IsolationForest::new().with_seed(1),
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        fixture_bundle().save(file.path()).unwrap();

        let loaded = ModelBundle::load(file.path()).unwrap();
        assert_eq!(loaded.model.n_features(), 2);
        assert_eq!(loaded.label_encoder.classes().len(), 2);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ModelBundle::load(Path::new("/nonexistent/bundle.json")).unwrap_err();
        assert!(matches!(err, StockcastError::NotFound(_)));
    }

    #[test]
    fn test_missing_component_named_exactly() {
        // Serialize, drop scaler_y, reload
        let json = serde_json::to_value(fixture_bundle()).unwrap();
        let mut object = json.as_object().unwrap().clone();
        object.remove("scaler_y");

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            "{}",
            serde_json::to_string(&serde_json::Value::Object(object)).unwrap()
        )
        .unwrap();

        let err = ModelBundle::load(file.path()).unwrap_err();
        match err {
            StockcastError::ModelLoadError(msg) => {
                assert!(msg.contains("scaler_y"));
                assert!(!msg.contains("scaler_x"));
                assert!(!msg.contains("label_encoder"));
            }
            other => panic!("expected ModelLoadError, got {:?}", other),
        }
    }

    #[test]
    fn test_all_missing_components_listed() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{}}").unwrap();

        let err = ModelBundle::load(file.path()).unwrap_err();
        match err {
            StockcastError::ModelLoadError(msg) => {
                for component in REQUIRED_COMPONENTS {
                    assert!(msg.contains(component), "missing {} in message", component);
                }
            }
            other => panic!("expected ModelLoadError, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_artifact_is_model_load_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json at all").unwrap();

        let err = ModelBundle::load(file.path()).unwrap_err();
        match err {
            StockcastError::ModelLoadError(msg) => assert!(msg.contains("corrupt")),
            other => panic!("expected ModelLoadError, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_inventory() {
        let summary = fixture_bundle().summary();
        assert_eq!(summary.components.len(), 5);
        assert_eq!(summary.n_features, 2);
        assert_eq!(summary.vocabulary_size, 2);
    }
}
