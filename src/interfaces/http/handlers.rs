use super::error::{ApiError, ApiResult};
use super::server::AppState;
use crate::domain::ml::model::ModelId;
use crate::domain::ride::RideRequest;
use crate::interfaces::response::QuoteResponse;
use crate::interfaces::validation::validate_request;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, warn};

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<RideRequest>, JsonRejection>,
) -> ApiResult<Json<QuoteResponse>> {
    let started = Instant::now();
    let result = price_request(&state, payload).await;
    let elapsed = started.elapsed().as_secs_f64();

    match &result {
        Ok(response) => {
            state.metrics.observe_quote("ok", elapsed);
            for model in response.model_component_prices.keys() {
                state.metrics.inc_model_prediction(model.as_str());
            }
            debug!(
                "Quoted {:.2} (fair {:.2}) in {:.1}ms",
                response.final_ai_fare,
                response.fair_taxi_price,
                elapsed * 1000.0
            );
        }
        Err(e) => {
            state.metrics.observe_quote(e.outcome(), elapsed);
            match e {
                ApiError::Validation(msg) => warn!("Rejected fare request: {}", msg),
                other => error!("Fare request failed: {}", other),
            }
        }
    }

    result.map(Json)
}

async fn price_request(
    state: &AppState,
    payload: Result<Json<RideRequest>, JsonRejection>,
) -> ApiResult<QuoteResponse> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    validate_request(&request)?;

    // Inference is CPU-bound and the ONNX session is behind a mutex
    let estimator = state.estimator.clone();
    tokio::task::spawn_blocking(move || -> ApiResult<QuoteResponse> {
        let estimate = estimator.estimate(&request)?;
        Ok(QuoteResponse::compose(&request, &estimate))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("pricing task failed: {}", e)))?
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub models_loaded: Vec<ModelId>,
    pub models_missing: Vec<ModelId>,
}

/// GET /health
///
/// Degraded whenever any known model is absent, including when none are loaded.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let models_missing = state.estimator.missing_models();
    let status = if models_missing.is_empty() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        models_loaded: state.estimator.loaded_models(),
        models_missing,
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .uptime_seconds
        .set(state.started_at.elapsed().as_secs_f64());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
