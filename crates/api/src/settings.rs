//! Service configuration
//!
//! Built-in defaults overlaid by `MUNICIPIOS_*` environment variables,
//! e.g. `MUNICIPIOS_BIND_ADDR=127.0.0.1:3000`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;
use storage::DEFAULT_STORE_NAME;
use tracing::Level;
use upstream::{DEFAULT_TIMEOUT_SECS, IBGE_MUNICIPALITIES_URL};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MUNICIPIOS";

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Upstream municipality endpoint
    pub upstream_url: String,
    /// Upstream request timeout (seconds)
    pub upstream_timeout_secs: u64,
    /// Logical name of the in-memory store
    pub store_name: String,
    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            upstream_url: IBGE_MUNICIPALITIES_URL.to_string(),
            upstream_timeout_secs: DEFAULT_TIMEOUT_SECS,
            store_name: DEFAULT_STORE_NAME.to_string(),
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl ServiceConfig {
    /// Load defaults, then the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("upstream_url", defaults.upstream_url)?
            .set_default("upstream_timeout_secs", defaults.upstream_timeout_secs)?
            .set_default("store_name", defaults.store_name)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .set_default("metrics_enabled", defaults.metrics_enabled)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Upstream timeout as a duration
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// Parsed log level
    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Message(format!("invalid log_level '{}'", self.log_level)))
    }
}
