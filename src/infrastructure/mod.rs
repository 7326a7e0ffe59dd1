pub mod artifacts;
pub mod observability;

pub use artifacts::load_estimator;
pub use observability::Metrics;
