pub mod feature_registry;
pub mod features;
pub mod model;
