//! Configuration module for Fair Fare.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Artifacts, Pricing, and Server.

mod artifact_config;
mod pricing_config;
mod server_config;

pub use artifact_config::ArtifactEnvConfig;
pub use pricing_config::PricingEnvConfig;
pub use server_config::ServerEnvConfig;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Key/value source for configuration.
///
/// Production reads the process environment; tests hand in a map so they
/// never have to mutate global env state.
pub struct EnvReader {
    lookup: Box<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl EnvReader {
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key| env::var(key).ok()),
        }
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |key| map.get(key).cloned()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .context(format!("Failed to parse {}", key)),
            None => Ok(default),
        }
    }

    /// Comma-separated list; blank entries are dropped.
    pub fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub artifacts: ArtifactEnvConfig,
    pub pricing: PricingEnvConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader(reader: &EnvReader) -> Result<Self> {
        Ok(Self {
            artifacts: ArtifactEnvConfig::from_reader(reader),
            pricing: PricingEnvConfig::from_reader(reader)
                .context("Failed to load pricing config")?,
            server: ServerEnvConfig::from_reader(reader).context("Failed to load server config")?,
        })
    }
}
