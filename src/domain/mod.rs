// Trip geometry
pub mod geo;

// Feature layout and model identities
pub mod ml;

// Fair price, surge and fee rules
pub mod pricing;

// Request value types
pub mod ride;

// Domain-specific error types
pub mod errors;
