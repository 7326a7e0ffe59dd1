//! Prometheus metrics definitions for Fair Fare
//!
//! All metrics use the `fairfare_` prefix.

use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, IntGauge, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the fare service
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Quotes by outcome (ok, invalid, unavailable, error)
    pub quotes_total: CounterVec,
    /// Successful predictions per ensemble member
    pub model_predictions_total: CounterVec,
    /// Models currently loaded into the ensemble
    pub models_loaded: IntGauge,
    /// End-to-end quote latency
    pub quote_latency_seconds: HistogramVec,
    /// Seconds since startup
    pub uptime_seconds: GenericGauge<AtomicF64>,
}

impl Metrics {
    /// Create a new Metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let quotes_total = CounterVec::new(
            Opts::new("fairfare_quotes_total", "Total fare quotes by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(quotes_total.clone()))?;

        let model_predictions_total = CounterVec::new(
            Opts::new(
                "fairfare_model_predictions_total",
                "Successful predictions per model",
            ),
            &["model"],
        )?;
        registry.register(Box::new(model_predictions_total.clone()))?;

        let models_loaded = IntGauge::with_opts(Opts::new(
            "fairfare_models_loaded",
            "Number of models loaded into the ensemble",
        ))?;
        registry.register(Box::new(models_loaded.clone()))?;

        let quote_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "fairfare_quote_latency_seconds",
                "Fare quote latency in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
            &["outcome"],
        )?;
        registry.register(Box::new(quote_latency_seconds.clone()))?;

        let uptime_seconds = Gauge::with_opts(Opts::new(
            "fairfare_uptime_seconds",
            "Server uptime in seconds",
        ))?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            quotes_total,
            model_predictions_total,
            models_loaded,
            quote_latency_seconds,
            uptime_seconds,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Record one finished quote request
    pub fn observe_quote(&self, outcome: &str, latency: f64) {
        self.quotes_total.with_label_values(&[outcome]).inc();
        self.quote_latency_seconds
            .with_label_values(&[outcome])
            .observe(latency);
    }

    pub fn inc_model_prediction(&self, model: &str) {
        self.model_predictions_total
            .with_label_values(&[model])
            .inc();
    }
}
