//! Startup loading of the fitted preprocessors and trained models.
//!
//! Preprocessors are required: without them no request can be priced, so
//! any failure aborts startup. Models are best-effort; each one that fails
//! to load is logged and left out of the ensemble.

use crate::application::ml::onnx_predictor::OnnxPredictor;
use crate::application::ml::sklearn_preprocessors::{
    OneHotEncoder, OneHotEncoderSpec, StandardScaler, StandardScalerSpec,
};
use crate::application::ml::smartcore_predictor::SmartCorePredictor;
use crate::application::ml::{EnsemblePredictor, FarePredictor, PreprocessingStage};
use crate::application::FareEstimator;
use crate::config::{ArtifactEnvConfig, PricingEnvConfig};
use crate::domain::errors::ArtifactError;
use crate::domain::ml::model::ModelId;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

pub fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a fitted sklearn dump, then validates it. Well-formed JSON that
/// describes an unusable preprocessor is `Malformed`, not `Parse`.
fn read_fitted<S, T>(path: &Path) -> Result<T, ArtifactError>
where
    S: DeserializeOwned,
    T: TryFrom<S, Error = String>,
{
    let spec: S = read_json_artifact(path)?;
    T::try_from(spec).map_err(|reason| ArtifactError::malformed(format!("{:?}: {}", path, reason)))
}

pub fn load_preprocessing(config: &ArtifactEnvConfig) -> Result<PreprocessingStage, ArtifactError> {
    let scaler: StandardScaler = read_fitted::<StandardScalerSpec, _>(&config.scaler_path)?;
    let encoder: OneHotEncoder = read_fitted::<OneHotEncoderSpec, _>(&config.encoder_path)?;
    let stage = PreprocessingStage::new(Box::new(scaler), Box::new(encoder))?;

    info!(
        "Loaded preprocessors from {:?} and {:?} ({} model input columns)",
        config.scaler_path,
        config.encoder_path,
        stage.layout().len()
    );
    Ok(stage)
}

/// Picks the backend from the file extension: `.onnx` runs through ONNX
/// Runtime, anything else is read as a smartcore JSON model.
pub fn load_model(id: ModelId, path: &Path) -> Result<Box<dyn FarePredictor>, ArtifactError> {
    let is_onnx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        Ok(Box::new(OnnxPredictor::load(id, path)?))
    } else {
        Ok(Box::new(SmartCorePredictor::load(id, path)?))
    }
}

/// Refuses a model whose fitted input width disagrees with the
/// preprocessing layout. Models that do not record a width pass through.
pub fn ensure_width(
    model: Box<dyn FarePredictor>,
    layout_width: usize,
) -> Result<Box<dyn FarePredictor>, ArtifactError> {
    match model.n_features() {
        Some(fitted) if fitted != layout_width => Err(ArtifactError::WidthMismatch {
            model: model.id(),
            fitted,
            layout: layout_width,
        }),
        _ => Ok(model),
    }
}

/// Loads every configured model that agrees with a `layout_width`-column
/// feature vector.
pub fn load_ensemble(config: &ArtifactEnvConfig, layout_width: usize) -> EnsemblePredictor {
    let mut ensemble = EnsemblePredictor::new();

    for id in ModelId::ALL {
        match config.model_paths.get(&id) {
            Some(path) => match load_model(id, path).and_then(|m| ensure_width(m, layout_width)) {
                Ok(model) => ensemble.insert(model),
                Err(e) => warn!("Model {} unavailable: {}", id, e),
            },
            None => info!("Model {} disabled by configuration", id),
        }
    }

    info!(
        "Ensemble ready with {}/{} models: {:?}",
        ensemble.len(),
        ModelId::ALL.len(),
        ensemble.backends()
    );
    ensemble
}

/// Builds the request pipeline from on-disk artifacts.
pub fn load_estimator(
    artifacts: &ArtifactEnvConfig,
    pricing: &PricingEnvConfig,
) -> Result<FareEstimator, ArtifactError> {
    let preprocessing = load_preprocessing(artifacts)?;
    let ensemble = load_ensemble(artifacts, preprocessing.layout().len());
    Ok(FareEstimator::new(
        preprocessing,
        ensemble,
        pricing.fare.clone(),
        pricing.surge.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::smartcore_predictor::LinearModel;
    use smartcore::linalg::basic::matrix::DenseMatrix;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn write_preprocessors(dir: &TempDir) -> ArtifactEnvConfig {
        let scaler_path = dir.path().join("scaler.json");
        let encoder_path = dir.path().join("encoder.json");
        fs::write(
            &scaler_path,
            r#"{"feature_names_in_": ["trip_distance", "hour"], "mean_": [3.0, 12.0], "scale_": [2.0, 6.0]}"#,
        )
        .unwrap();
        fs::write(
            &encoder_path,
            r#"{"feature_names_in_": ["weather_condition"], "categories_": [["Rainy", "Sunny"]]}"#,
        )
        .unwrap();

        ArtifactEnvConfig {
            scaler_path,
            encoder_path,
            model_paths: BTreeMap::new(),
        }
    }

    #[test]
    fn test_load_preprocessing_layout() {
        let dir = TempDir::new().unwrap();
        let config = write_preprocessors(&dir);

        let stage = load_preprocessing(&config).unwrap();
        assert_eq!(
            stage.layout(),
            &[
                "trip_distance",
                "hour",
                "weather_condition_Rainy",
                "weather_condition_Sunny"
            ]
        );
    }

    #[test]
    fn test_missing_scaler_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = write_preprocessors(&dir);
        config.scaler_path = dir.path().join("absent.json");

        assert!(matches!(
            load_preprocessing(&config),
            Err(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_inconsistent_encoder_is_malformed() {
        let dir = TempDir::new().unwrap();
        let config = write_preprocessors(&dir);
        fs::write(
            &config.encoder_path,
            r#"{"feature_names_in_": ["a", "b"], "categories_": [["x"]]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_preprocessing(&config),
            Err(ArtifactError::Malformed { .. })
        ));
    }

    #[test]
    fn test_infrequent_encoder_options_are_malformed() {
        let dir = TempDir::new().unwrap();
        let config = write_preprocessors(&dir);

        for options in [
            r#""handle_unknown": "infrequent_if_exist""#,
            r#""handle_unknown": "warn""#,
            r#""min_frequency": 10"#,
            r#""max_categories": 4"#,
        ] {
            fs::write(
                &config.encoder_path,
                format!(
                    r#"{{"feature_names_in_": ["weather_condition"], "categories_": [["Rainy", "Sunny"]], {}}}"#,
                    options
                ),
            )
            .unwrap();

            match load_preprocessing(&config) {
                Err(ArtifactError::Malformed { reason }) => {
                    assert!(reason.contains("not supported"), "{options}: {reason}")
                }
                Err(other) => panic!("{options}: expected malformed, got {other}"),
                Ok(_) => panic!("{options}: expected malformed, got a stage"),
            }
        }
    }

    #[test]
    fn test_corrupt_scaler_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let config = write_preprocessors(&dir);
        fs::write(&config.scaler_path, "{ not json").unwrap();

        assert!(matches!(
            load_preprocessing(&config),
            Err(ArtifactError::Parse { .. })
        ));
    }

    #[test]
    fn test_broken_models_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut config = write_preprocessors(&dir);
        let corrupt = dir.path().join("rf.json");
        fs::write(&corrupt, "not a model").unwrap();
        config
            .model_paths
            .insert(ModelId::LinearRegression, dir.path().join("missing.json"));
        config.model_paths.insert(ModelId::RandomForest, corrupt);

        let estimator = load_estimator(&config, &PricingEnvConfig::default()).unwrap();
        assert!(estimator.loaded_models().is_empty());
        assert_eq!(estimator.missing_models().len(), 3);
    }

    #[test]
    fn test_onnx_extension_selects_onnx_backend() {
        let result = load_model(ModelId::HistGbm, Path::new("absent/hist_gbm.ONNX"));
        assert!(matches!(result, Err(ArtifactError::NotFound { .. })));

        let dir = TempDir::new().unwrap();
        let json = dir.path().join("hist_gbm.json");
        fs::write(&json, "{}").unwrap();
        assert!(matches!(
            load_model(ModelId::HistGbm, &json),
            Err(ArtifactError::UnsupportedFormat { .. })
        ));
    }

    fn write_linear(path: &Path, width: usize) {
        let mut rows: Vec<Vec<f64>> = (0..width)
            .map(|i| (0..width).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        rows.push(vec![0.0; width]);
        rows.push(vec![1.0; width]);
        let y: Vec<f64> = rows.iter().map(|r| 2.0 + r.iter().sum::<f64>()).collect();
        let x = DenseMatrix::from_2d_vec(&rows).unwrap();
        let model = LinearModel::fit(&x, &y, Default::default()).unwrap();
        fs::write(path, serde_json::to_string(&model).unwrap()).unwrap();
    }

    fn write_six_column_encoder(config: &ArtifactEnvConfig) {
        fs::write(
            &config.encoder_path,
            r#"{"feature_names_in_": ["weather_condition", "car_type"], "categories_": [["Rainy", "Sunny"], ["Economy", "Premium"]]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_model_narrower_than_layout_is_omitted() {
        let dir = TempDir::new().unwrap();
        let mut config = write_preprocessors(&dir);
        write_six_column_encoder(&config);
        let linear = dir.path().join("linear.json");
        write_linear(&linear, 4);
        config
            .model_paths
            .insert(ModelId::LinearRegression, linear.clone());

        assert_eq!(load_preprocessing(&config).unwrap().layout().len(), 6);
        let checked = load_model(ModelId::LinearRegression, &linear).and_then(|m| ensure_width(m, 6));
        assert!(matches!(
            checked,
            Err(ArtifactError::WidthMismatch {
                model: ModelId::LinearRegression,
                fitted: 4,
                layout: 6,
            })
        ));

        let estimator = load_estimator(&config, &PricingEnvConfig::default()).unwrap();
        assert!(estimator.loaded_models().is_empty());
    }

    #[test]
    fn test_model_matching_layout_is_kept() {
        let dir = TempDir::new().unwrap();
        let mut config = write_preprocessors(&dir);
        write_six_column_encoder(&config);
        let linear = dir.path().join("linear.json");
        write_linear(&linear, 6);
        config.model_paths.insert(ModelId::LinearRegression, linear);

        let estimator = load_estimator(&config, &PricingEnvConfig::default()).unwrap();
        assert_eq!(estimator.loaded_models(), vec![ModelId::LinearRegression]);
    }
}
