//! Presentation of a fare estimate: rounding and field naming for clients.

use crate::application::FareEstimate;
use crate::domain::ml::model::ModelId;
use crate::domain::pricing::quote::round_to;
use crate::domain::ride::RideRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PRICE_DECIMALS: i32 = 2;
const DISTANCE_DECIMALS: i32 = 3;

/// Echo of the request, with the distance actually used for pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInputs {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub drop_lat: f64,
    pub drop_lng: f64,
    pub distance_km: f64,
    pub traffic_level: f64,
    pub weather: String,
    pub car_type: String,
    pub hour: u8,
    pub day_of_week: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub fair_taxi_price: f64,
    pub model_base_price: f64,
    pub hidden_fee_vs_fair: f64,
    pub final_ai_fare: f64,
    pub surge_multiplier: f64,
    pub surge_fee: f64,
    pub model_used: String,
    pub model_component_prices: BTreeMap<ModelId, f64>,
    pub inputs: QuoteInputs,
}

impl QuoteResponse {
    /// Rounds every figure independently from the unrounded estimate, so
    /// `hidden_fee_vs_fair` may differ by a cent from the difference of the
    /// two rounded prices.
    pub fn compose(request: &RideRequest, estimate: &FareEstimate) -> Self {
        let price = |value: f64| round_to(value, PRICE_DECIMALS);
        let quote = &estimate.quote;

        Self {
            fair_taxi_price: price(quote.fair_price),
            model_base_price: price(quote.model_base_price),
            hidden_fee_vs_fair: price(quote.hidden_fee_vs_fair),
            final_ai_fare: price(quote.final_fare),
            surge_multiplier: price(quote.surge_multiplier),
            surge_fee: price(quote.surge_fee),
            model_used: "ensemble".to_string(),
            model_component_prices: estimate
                .prediction
                .component_prices
                .iter()
                .map(|(id, value)| (*id, price(*value)))
                .collect(),
            inputs: QuoteInputs {
                pickup_lat: request.pickup_lat,
                pickup_lng: request.pickup_lng,
                drop_lat: request.drop_lat,
                drop_lng: request.drop_lng,
                distance_km: round_to(estimate.distance.km, DISTANCE_DECIMALS),
                traffic_level: request.traffic_level,
                weather: request.weather.clone(),
                car_type: request.car_type.clone(),
                hour: request.hour,
                day_of_week: request.day_of_week,
            },
        }
    }
}
