pub mod ensemble;
pub mod onnx_predictor;
pub mod predictor;
pub mod preprocessing;
pub mod sklearn_preprocessors;
pub mod smartcore_predictor;

pub use ensemble::EnsemblePredictor;
pub use predictor::FarePredictor;
pub use preprocessing::{CategoricalEncoder, NumericScaler, PreprocessingStage};
