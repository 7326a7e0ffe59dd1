use serde::{Deserialize, Serialize};

/// A single fare request as received at the boundary.
///
/// Field presence and basic types are enforced by deserialization; range
/// checks belong to the transport layer. `weather` and `car_type` are passed
/// through verbatim and never checked against a closed vocabulary here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub pickup_lat: f64,
    pub pickup_lng: f64,
    pub drop_lat: f64,
    pub drop_lng: f64,
    /// Supplied trip distance. `<= 0` means unknown.
    pub distance_km: f64,
    /// Congestion slider, 0-100
    pub traffic_level: f64,
    /// e.g. "Sunny", "Cloudy", "Rainy"
    pub weather: String,
    /// e.g. "Economy", "Comfort", "Premium", "SUV"
    pub car_type: String,
    /// 0-23
    pub hour: u8,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u8,
}

#[cfg(test)]
impl RideRequest {
    /// Manhattan-ish trip used across unit tests.
    pub fn sample() -> Self {
        Self {
            pickup_lat: 40.7580,
            pickup_lng: -73.9855,
            drop_lat: 40.7128,
            drop_lng: -74.0060,
            distance_km: 10.0,
            traffic_level: 0.0,
            weather: "Sunny".to_string(),
            car_type: "Economy".to_string(),
            hour: 8,
            day_of_week: 1,
        }
    }
}
