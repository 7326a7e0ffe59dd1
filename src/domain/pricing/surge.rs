use serde::{Deserialize, Serialize};

/// Surge classification thresholds.
///
/// These are business policy, not learned values; every field is
/// overridable from the environment (see `config::PricingEnvConfig`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgePolicy {
    /// Traffic strictly above this triggers the high multiplier
    pub high_traffic_threshold: f64,
    /// Traffic strictly above this (and not high) triggers the moderate multiplier
    pub moderate_traffic_threshold: f64,
    pub high_multiplier: f64,
    pub moderate_multiplier: f64,
    /// Weather values (exact match) that always trigger the high multiplier
    pub adverse_weather: Vec<String>,
}

impl Default for SurgePolicy {
    fn default() -> Self {
        Self {
            high_traffic_threshold: 60.0,
            moderate_traffic_threshold: 35.0,
            high_multiplier: 1.30,
            moderate_multiplier: 1.15,
            adverse_weather: vec![
                "Rainy".to_string(),
                "Snowy".to_string(),
                "Foggy".to_string(),
            ],
        }
    }
}

impl SurgePolicy {
    pub fn is_adverse_weather(&self, weather: &str) -> bool {
        self.adverse_weather.iter().any(|w| w == weather)
    }

    pub fn multiplier(&self, traffic_level: f64, weather: &str) -> f64 {
        if traffic_level > self.high_traffic_threshold || self.is_adverse_weather(weather) {
            self.high_multiplier
        } else if traffic_level > self.moderate_traffic_threshold {
            self.moderate_multiplier
        } else {
            1.0
        }
    }
}
