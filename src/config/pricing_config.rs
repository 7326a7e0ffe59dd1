//! Pricing policy parsing from environment variables.
//!
//! This module handles the business knobs of the rule engine: the fair-price
//! formula constants and the surge classification.

use super::EnvReader;
use crate::domain::pricing::{FarePolicy, SurgePolicy};
use anyhow::{Result, bail};

/// Pricing environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PricingEnvConfig {
    pub fare: FarePolicy,
    pub surge: SurgePolicy,
}

impl PricingEnvConfig {
    pub fn from_reader(reader: &EnvReader) -> Result<Self> {
        let fare_defaults = FarePolicy::default();
        let surge_defaults = SurgePolicy::default();

        let fare = FarePolicy {
            base_fare: reader.parse("FARE_BASE", fare_defaults.base_fare)?,
            per_km_rate: reader.parse("FARE_PER_KM", fare_defaults.per_km_rate)?,
            min_distance_km: reader.parse("FARE_MIN_DISTANCE_KM", fare_defaults.min_distance_km)?,
            max_traffic_surcharge: reader.parse(
                "FARE_MAX_TRAFFIC_SURCHARGE",
                fare_defaults.max_traffic_surcharge,
            )?,
        };

        let default_weather: Vec<&str> = surge_defaults
            .adverse_weather
            .iter()
            .map(String::as_str)
            .collect();

        let surge = SurgePolicy {
            high_traffic_threshold: reader.parse(
                "SURGE_HIGH_TRAFFIC_THRESHOLD",
                surge_defaults.high_traffic_threshold,
            )?,
            moderate_traffic_threshold: reader.parse(
                "SURGE_MODERATE_TRAFFIC_THRESHOLD",
                surge_defaults.moderate_traffic_threshold,
            )?,
            high_multiplier: reader.parse("SURGE_HIGH_MULTIPLIER", surge_defaults.high_multiplier)?,
            moderate_multiplier: reader.parse(
                "SURGE_MODERATE_MULTIPLIER",
                surge_defaults.moderate_multiplier,
            )?,
            adverse_weather: reader.list("SURGE_ADVERSE_WEATHER", &default_weather),
        };

        let config = Self { fare, surge };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fare = &self.fare;
        for (name, value) in [
            ("FARE_BASE", fare.base_fare),
            ("FARE_PER_KM", fare.per_km_rate),
            ("FARE_MIN_DISTANCE_KM", fare.min_distance_km),
            ("FARE_MAX_TRAFFIC_SURCHARGE", fare.max_traffic_surcharge),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must be a non-negative number, got {}", name, value);
            }
        }

        let surge = &self.surge;
        if surge.moderate_traffic_threshold > surge.high_traffic_threshold {
            bail!(
                "SURGE_MODERATE_TRAFFIC_THRESHOLD ({}) must not exceed SURGE_HIGH_TRAFFIC_THRESHOLD ({})",
                surge.moderate_traffic_threshold,
                surge.high_traffic_threshold
            );
        }
        for (name, value) in [
            ("SURGE_HIGH_MULTIPLIER", surge.high_multiplier),
            ("SURGE_MODERATE_MULTIPLIER", surge.moderate_multiplier),
        ] {
            if !value.is_finite() || value < 1.0 {
                bail!("{} must be at least 1.0, got {}", name, value);
            }
        }
        Ok(())
    }
}

impl Default for PricingEnvConfig {
    fn default() -> Self {
        Self {
            fare: FarePolicy::default(),
            surge: SurgePolicy::default(),
        }
    }
}
