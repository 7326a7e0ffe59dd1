use super::predictor::{FarePredictor, check_width};
use crate::domain::errors::ArtifactError;
use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::ModelId;
use serde::Deserialize;
use serde_json::Value;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub type LinearModel = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

enum SmartCoreModel {
    Linear(LinearModel),
    RandomForest(ForestModel),
}

/// On-disk wrapper recording how many columns the model was fitted on.
///
/// Required for random forests, which do not keep their input width.
/// Optional for linear models, whose width is the coefficient count.
#[derive(Deserialize)]
struct ModelEnvelope {
    n_features_in: usize,
    model: Value,
}

/// Regressor serialized by smartcore (JSON via serde).
pub struct SmartCorePredictor {
    id: ModelId,
    model: SmartCoreModel,
    n_features: usize,
}

impl SmartCorePredictor {
    /// Wraps a fitted linear model.
    ///
    /// # Panics
    ///
    /// If the model was never fitted (smartcore keeps no coefficients).
    pub fn linear(model: LinearModel) -> Self {
        use smartcore::linalg::basic::arrays::Array;

        let (n_features, _) = model.coefficients().shape();
        Self {
            id: ModelId::LinearRegression,
            model: SmartCoreModel::Linear(model),
            n_features,
        }
    }

    pub fn random_forest(model: ForestModel, n_features: usize) -> Self {
        Self {
            id: ModelId::RandomForest,
            model: SmartCoreModel::RandomForest(model),
            n_features,
        }
    }

    /// Loads the smartcore model type that backs `id`.
    ///
    /// Accepts either a bare smartcore dump or `{"n_features_in": N, "model": ...}`.
    /// smartcore has no histogram gradient boosting, so `HistGbm` must come
    /// from an ONNX artifact instead.
    pub fn load(id: ModelId, path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound {
                path: path.to_path_buf(),
            });
        }
        if id == ModelId::HistGbm {
            return Err(ArtifactError::UnsupportedFormat {
                model: id,
                path: path.to_path_buf(),
            });
        }

        let io_err = |source: std::io::Error| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut buffer = Vec::new();
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .map_err(io_err)?;

        let parse_err = |source: serde_json::Error| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let document: Value = serde_json::from_slice(&buffer).map_err(parse_err)?;
        let (declared, body) = if document.get("model").is_some() {
            let envelope: ModelEnvelope = serde_json::from_value(document).map_err(parse_err)?;
            (Some(envelope.n_features_in), envelope.model)
        } else {
            (None, document)
        };

        let predictor = match id {
            ModelId::RandomForest => {
                let n_features = declared.ok_or_else(|| {
                    ArtifactError::malformed(format!(
                        "random forest {:?} must be wrapped as {{\"n_features_in\": N, \"model\": ...}}",
                        path
                    ))
                })?;
                Self::random_forest(serde_json::from_value(body).map_err(parse_err)?, n_features)
            }
            _ => {
                let fitted = ["coefficients", "intercept"]
                    .iter()
                    .all(|key| body.get(*key).is_some_and(|v| !v.is_null()));
                if !fitted {
                    return Err(ArtifactError::malformed(format!(
                        "linear model {:?} has no fitted coefficients",
                        path
                    )));
                }
                let predictor = Self::linear(serde_json::from_value(body).map_err(parse_err)?);
                if let Some(n) = declared.filter(|n| *n != predictor.n_features) {
                    return Err(ArtifactError::malformed(format!(
                        "linear model {:?} declares {} input columns but has {} coefficients",
                        path, n, predictor.n_features
                    )));
                }
                predictor
            }
        };
        if predictor.n_features == 0 {
            return Err(ArtifactError::malformed(format!(
                "model {:?} declares no input columns",
                path
            )));
        }

        info!(
            "Successfully loaded {} model from {:?} ({} input columns)",
            id, path, predictor.n_features
        );
        Ok(predictor)
    }
}

impl FarePredictor for SmartCorePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, String> {
        // smartcore panics on a column count it was not fitted on
        check_width(self.n_features, features)?;

        let input_matrix = DenseMatrix::from_2d_vec(&vec![features.values().to_vec()])
            .map_err(|e| format!("Matrix creation failed: {}", e))?;

        let predictions = match &self.model {
            SmartCoreModel::Linear(model) => model.predict(&input_matrix),
            SmartCoreModel::RandomForest(model) => model.predict(&input_matrix),
        }
        .map_err(|e| format!("Prediction failed: {}", e))?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| "No prediction returned".to_string())
    }

    fn id(&self) -> ModelId {
        self.id
    }

    fn backend(&self) -> &str {
        match self.model {
            SmartCoreModel::Linear(_) => "SmartCore Linear Regression",
            SmartCoreModel::RandomForest(_) => "SmartCore Random Forest",
        }
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }
}
