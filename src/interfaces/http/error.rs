use crate::domain::errors::PricingError;
use crate::interfaces::validation::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors a handler can surface to a client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range request (422)
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pricing(PricingError::NoModelsAvailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pricing(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the `outcome` metric dimension
    pub fn outcome(&self) -> &'static str {
        match self.status() {
            StatusCode::UNPROCESSABLE_ENTITY => "invalid",
            StatusCode::SERVICE_UNAVAILABLE => "unavailable",
            _ => "error",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ml::model::ModelId;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("hour".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(PricingError::NoModelsAvailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        let failure = PricingError::ModelFailure {
            model: ModelId::HistGbm,
            reason: "NaN".to_string(),
        };
        assert_eq!(
            ApiError::from(failure).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ApiError::Validation(String::new()).outcome(), "invalid");
        assert_eq!(
            ApiError::from(PricingError::NoModelsAvailable).outcome(),
            "unavailable"
        );
        assert_eq!(ApiError::Internal(String::new()).outcome(), "error");
    }
}
