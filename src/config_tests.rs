use crate::config::{Config, EnvReader};
use crate::domain::ml::model::ModelId;
use std::collections::HashMap;
use std::path::PathBuf;

fn reader(pairs: &[(&str, &str)]) -> EnvReader {
    EnvReader::from_map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

#[test]
fn test_config_defaults() {
    let config = Config::from_reader(&reader(&[])).unwrap();

    assert_eq!(config.server.port, 8500);
    assert_eq!(config.pricing.fare.base_fare, 3.0);
    assert_eq!(config.pricing.surge.high_multiplier, 1.30);
    assert_eq!(config.artifacts.model_paths.len(), ModelId::ALL.len());
}

#[test]
fn test_config_overrides_every_section() {
    let config = Config::from_reader(&reader(&[
        ("SCALER_PATH", "/srv/artifacts/scaler.json"),
        ("HIST_GBM_MODEL_PATH", ""),
        ("FARE_PER_KM", "2.4"),
        ("SURGE_MODERATE_TRAFFIC_THRESHOLD", "40"),
        ("SERVER_PORT", "9000"),
        ("CORS_ALLOWED_ORIGINS", "https://fares.example.com"),
    ]))
    .unwrap();

    assert_eq!(
        config.artifacts.scaler_path,
        PathBuf::from("/srv/artifacts/scaler.json")
    );
    assert!(!config.artifacts.model_paths.contains_key(&ModelId::HistGbm));
    assert_eq!(config.pricing.fare.per_km_rate, 2.4);
    assert_eq!(config.pricing.surge.moderate_traffic_threshold, 40.0);
    assert_eq!(config.server.port, 9000);
    assert_eq!(
        config.server.cors_allowed_origins,
        vec!["https://fares.example.com".to_string()]
    );
}

#[test]
fn test_config_invalid_pricing_is_rejected() {
    let err = Config::from_reader(&reader(&[("FARE_BASE", "-1")])).unwrap_err();
    assert!(format!("{:#}", err).contains("FARE_BASE"));
}

#[test]
fn test_config_invalid_port_is_rejected() {
    assert!(Config::from_reader(&reader(&[("SERVER_PORT", "eighty")])).is_err());
}
