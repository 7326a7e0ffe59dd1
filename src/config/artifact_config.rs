//! Artifact location parsing from environment variables.

use super::EnvReader;
use crate::domain::ml::model::ModelId;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Where the trained models and fitted preprocessors live on disk
#[derive(Debug, Clone)]
pub struct ArtifactEnvConfig {
    pub scaler_path: PathBuf,
    pub encoder_path: PathBuf,
    /// Configured models only; an empty path disables a model
    pub model_paths: BTreeMap<ModelId, PathBuf>,
}

impl ArtifactEnvConfig {
    fn model_env(id: ModelId) -> (&'static str, &'static str) {
        match id {
            ModelId::LinearRegression => {
                ("LINEAR_MODEL_PATH", "models/linear_regression_model.json")
            }
            ModelId::RandomForest => ("RF_MODEL_PATH", "models/random_forest_model.json"),
            ModelId::HistGbm => ("HIST_GBM_MODEL_PATH", "models/hist_gbm_model.onnx"),
        }
    }

    pub fn from_reader(reader: &EnvReader) -> Self {
        let model_paths = ModelId::ALL
            .into_iter()
            .filter_map(|id| {
                let (key, default) = Self::model_env(id);
                let path = reader.string(key, default);
                let path = path.trim();
                (!path.is_empty()).then(|| (id, PathBuf::from(path)))
            })
            .collect();

        Self {
            scaler_path: reader.string("SCALER_PATH", "models/scaler.json").into(),
            encoder_path: reader.string("ENCODER_PATH", "models/encoder.json").into(),
            model_paths,
        }
    }
}

impl Default for ArtifactEnvConfig {
    fn default() -> Self {
        Self::from_reader(&EnvReader::from_map(Default::default()))
    }
}
