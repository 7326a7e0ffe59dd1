use crate::domain::ml::features::FeatureVector;
use crate::domain::ml::model::ModelId;

/// Interface for trained fare regressors
pub trait FarePredictor: Send + Sync {
    /// Predict the app/model base price for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<f64, String>;

    /// Which ensemble slot this model fills
    fn id(&self) -> ModelId;

    /// Get backend name (for logs and health output)
    fn backend(&self) -> &str;

    /// Number of input columns the model was fitted on, when the artifact
    /// records it. `None` means the width is not known up front.
    fn n_features(&self) -> Option<usize> {
        None
    }
}

/// Rejects a feature vector whose width differs from the fitted one.
pub(crate) fn check_width(expected: usize, features: &FeatureVector) -> Result<(), String> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(format!(
            "model expects {} input columns, got {}",
            expected,
            features.len()
        ))
    }
}
