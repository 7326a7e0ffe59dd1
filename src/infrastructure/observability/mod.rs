//! Observability for Fair Fare
//!
//! Prometheus metrics are exposed over `GET /metrics`; everything else goes
//! through `tracing`.

pub mod metrics;

pub use metrics::Metrics;
