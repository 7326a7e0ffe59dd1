//! Fair Fare Server - ride price transparency API
//!
//! Loads the fitted preprocessors and the model ensemble once, then serves
//! fare quotes over HTTP.
//!
//! # Usage
//! ```sh
//! SERVER_PORT=8500 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `SCALER_PATH`, `ENCODER_PATH` - fitted preprocessors (required)
//! - `LINEAR_MODEL_PATH`, `RF_MODEL_PATH`, `HIST_GBM_MODEL_PATH` - models (empty disables)
//! - `SERVER_BIND_ADDRESS`, `SERVER_PORT`, `CORS_ALLOWED_ORIGINS`
//! - `FARE_*`, `SURGE_*` - pricing policy overrides

use anyhow::{Context, Result};
use fairfare::config::Config;
use fairfare::infrastructure::load_estimator;
use fairfare::infrastructure::observability::Metrics;
use fairfare::interfaces::http::{AppState, build_router, serve};
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Fair Fare Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: scaler={:?}, encoder={:?}, models={:?}",
        config.artifacts.scaler_path, config.artifacts.encoder_path, config.artifacts.model_paths
    );
    info!(
        "Pricing policy: {:?}, surge: {:?}",
        config.pricing.fare, config.pricing.surge
    );

    let estimator = load_estimator(&config.artifacts, &config.pricing)
        .context("Failed to load preprocessing artifacts")?;
    let metrics = Metrics::new()?;

    let state = AppState::new(estimator, metrics);
    let app = build_router(state, &config.server.cors_allowed_origins);

    let addr = config.server.socket_addr()?;
    info!("Server running. Press Ctrl+C to shutdown.");
    serve(app, addr).await
}
