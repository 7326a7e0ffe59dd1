use crate::domain::ml::model::ModelId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while pricing a single ride request
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("No ML models are loaded - cannot predict app price")]
    NoModelsAvailable,

    #[error("Feature transform failed: {reason}")]
    Transform { reason: String },

    #[error("Model {model} failed to predict: {reason}")]
    ModelFailure { model: ModelId, reason: String },

    #[error("Feature vector shape mismatch: expected {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl PricingError {
    pub fn transform(reason: impl Into<String>) -> Self {
        Self::Transform {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a model or preprocessor artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("Failed to read artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed artifact: {reason}")]
    Malformed { reason: String },

    #[error(
        "Model {model} was fitted on {fitted} input columns but the preprocessors produce {layout}"
    )]
    WidthMismatch {
        model: ModelId,
        fitted: usize,
        layout: usize,
    },

    #[error("Unsupported artifact format for {model}: {path:?}")]
    UnsupportedFormat { model: ModelId, path: PathBuf },

    #[error("Model backend error: {reason}")]
    Backend { reason: String },
}

impl ArtifactError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}
