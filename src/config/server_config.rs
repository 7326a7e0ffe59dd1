//! HTTP server configuration parsing from environment variables.

use super::EnvReader;
use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Server environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerEnvConfig {
    pub fn from_reader(reader: &EnvReader) -> Result<Self> {
        Ok(Self {
            bind_address: reader.string("SERVER_BIND_ADDRESS", "0.0.0.0"),
            port: reader.parse("SERVER_PORT", 8500u16)?,
            cors_allowed_origins: reader.list(
                "CORS_ALLOWED_ORIGINS",
                &["http://localhost:5173", "http://127.0.0.1:5174"],
            ),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .context(format!(
                "Invalid SERVER_BIND_ADDRESS/SERVER_PORT: {}:{}",
                self.bind_address, self.port
            ))
    }
}
