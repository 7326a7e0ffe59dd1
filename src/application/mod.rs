// Model backends, preprocessing and the ensemble
pub mod ml;

// Request-scoped pricing pipeline
pub mod fare_estimator;

pub use fare_estimator::{FareEstimate, FareEstimator};
