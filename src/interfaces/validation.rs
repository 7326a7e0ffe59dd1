//! Range checks applied to ride requests before they reach the pricing core.

use crate::domain::ride::RideRequest;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

/// Rejects values no trained model could make sense of.
///
/// Weather and car type are free text; unknown values are the encoder's call.
pub fn validate_request(request: &RideRequest) -> Result<(), ValidationError> {
    finite("pickup_lat", request.pickup_lat)?;
    finite("pickup_lng", request.pickup_lng)?;
    finite("drop_lat", request.drop_lat)?;
    finite("drop_lng", request.drop_lng)?;
    finite("distance_km", request.distance_km)?;
    finite("traffic_level", request.traffic_level)?;

    within("traffic_level", request.traffic_level, 0.0, 100.0)?;
    within("hour", f64::from(request.hour), 0.0, 23.0)?;
    within("day_of_week", f64::from(request.day_of_week), 0.0, 6.0)?;
    Ok(())
}
