use serde::{Deserialize, Serialize};

/// Tariff for the transparent baseline fare.
///
/// Approximated from NYC yellow-taxi tariffs. Deliberately independent of any
/// trained artifact so the number can be explained to a rider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FarePolicy {
    /// Flag-drop charge
    pub base_fare: f64,
    pub per_km_rate: f64,
    /// Distances below this are billed as this
    pub min_distance_km: f64,
    /// Fractional surcharge at traffic level 100 (0.15 = +15%)
    pub max_traffic_surcharge: f64,
}

impl Default for FarePolicy {
    fn default() -> Self {
        Self {
            base_fare: 3.0,
            per_km_rate: 2.0,
            min_distance_km: 0.1,
            max_traffic_surcharge: 0.15,
        }
    }
}

impl FarePolicy {
    /// Converts the 0-100 traffic slider into a multiplier in `[1, 1 + max_traffic_surcharge]`.
    pub fn traffic_multiplier(&self, traffic_level: f64) -> f64 {
        1.0 + self.max_traffic_surcharge * (traffic_level / 100.0)
    }

    pub fn fair_price(&self, distance_km: f64, traffic_level: f64) -> f64 {
        let distance_component = self.per_km_rate * distance_km.max(self.min_distance_km);
        (self.base_fare + distance_component) * self.traffic_multiplier(traffic_level)
    }
}
