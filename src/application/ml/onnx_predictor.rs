use super::predictor::{FarePredictor, check_width};
use crate::domain::errors::ArtifactError;
use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::ModelId;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Regressor exported to ONNX (e.g. sklearn HistGradientBoosting via skl2onnx).
///
/// Expects one float32 input of shape `[1, n_features]` and one float output.
pub struct OnnxPredictor {
    id: ModelId,
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    // None when the graph leaves the feature dimension dynamic
    n_features: Option<usize>,
}

impl OnnxPredictor {
    pub fn load(id: ModelId, path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Backend {
                reason: format!("Failed to create ONNX session builder: {}", e),
            })?
            .commit_from_file(path)
            .map_err(|e| ArtifactError::Backend {
                reason: format!("Failed to load ONNX model {:?}: {}", path, e),
            })?;

        let input = session.inputs().first().ok_or_else(|| {
            ArtifactError::malformed(format!("ONNX model {:?} declares no inputs", path))
        })?;
        let n_features = input
            .dtype()
            .tensor_shape()
            .and_then(|shape| shape.last().copied())
            .and_then(|dim| usize::try_from(dim).ok())
            .filter(|dim| *dim > 0);

        info!(
            "Successfully loaded {} ONNX model from {:?} (input {:?}, {} columns)",
            id,
            path,
            input.name(),
            n_features.map_or_else(|| "dynamic".to_string(), |n| n.to_string())
        );
        Ok(Self {
            id,
            session: Mutex::new(session),
            n_features,
        })
    }

    fn features_to_inputs(features: &FeatureVector) -> Vec<f32> {
        features.values().iter().map(|v| *v as f32).collect()
    }
}

impl FarePredictor for OnnxPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64, String> {
        if let Some(expected) = self.n_features {
            check_width(expected, features)?;
        }
        let flat_data = Self::features_to_inputs(features);
        let shape = vec![1, flat_data.len()];

        let input_value = ort::value::Value::from_array((shape.as_slice(), flat_data))
            .map_err(|e| format!("Input value creation failed: {}", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| format!("Mutex lock failed: {}", e))?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| e.to_string())?;
        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or("No output found")?;
        let data = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| e.to_string())?;
        let price = *data.1.iter().next().ok_or("Empty output")?;
        Ok(price as f64)
    }

    fn id(&self) -> ModelId {
        self.id
    }

    fn backend(&self) -> &str {
        "ONNX Runtime"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}
