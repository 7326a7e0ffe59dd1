use super::fair_price::FarePolicy;
use super::surge::SurgePolicy;
use crate::domain::ride::RideRequest;
use serde::Serialize;

/// Final figures for one ride. All values are unrounded; rounding is a
/// presentation concern handled at the response boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FareQuote {
    pub fair_price: f64,
    pub model_base_price: f64,
    /// Positive when the model price exceeds the transparent baseline
    pub hidden_fee_vs_fair: f64,
    pub surge_multiplier: f64,
    pub surge_fee: f64,
    pub final_fare: f64,
}

impl FareQuote {
    pub fn new(model_base_price: f64, fair_price: f64, surge_multiplier: f64) -> Self {
        let final_fare = model_base_price * surge_multiplier;
        Self {
            fair_price,
            model_base_price,
            hidden_fee_vs_fair: model_base_price - fair_price,
            surge_multiplier,
            surge_fee: final_fare - model_base_price,
            final_fare,
        }
    }

    /// Prices `request` against both policies given the ensemble's base price.
    pub fn compute(
        request: &RideRequest,
        distance_km: f64,
        model_base_price: f64,
        fare_policy: &FarePolicy,
        surge_policy: &SurgePolicy,
    ) -> Self {
        let fair_price = fare_policy.fair_price(distance_km, request.traffic_level);
        let surge_multiplier = surge_policy.multiplier(request.traffic_level, &request.weather);
        Self::new(model_base_price, fair_price, surge_multiplier)
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
