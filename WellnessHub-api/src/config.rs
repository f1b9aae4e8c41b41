use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use wellness_hub_domain::services::SimulatedMetricsProvider;

/// Errors while reading server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// TCP port to listen on (`PORT`)
    pub port: u16,
    /// Directory holding the SQLite file (`DATA_DIR`)
    pub data_dir: PathBuf,
    /// Deployment name reported by the health check (`APP_ENV`)
    pub environment: String,
    /// Artificial delay of the simulated metrics provider (`METRICS_SIMULATED_LATENCY_MS`)
    pub metrics_latency: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("data"),
            environment: "development".to_string(),
            metrics_latency: SimulatedMetricsProvider::DEFAULT_LATENCY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => parse_var("PORT", &value)?,
            None => defaults.port,
        };

        let metrics_latency = match lookup("METRICS_SIMULATED_LATENCY_MS") {
            Some(value) => Duration::from_millis(parse_var("METRICS_SIMULATED_LATENCY_MS", &value)?),
            None => defaults.metrics_latency,
        };

        Ok(Self {
            port,
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            environment: lookup("APP_ENV").unwrap_or(defaults.environment),
            metrics_latency,
        })
    }

    /// SQLite file used when `DB_SQLITE_PATH` is not set
    pub fn default_sqlite_path(&self) -> PathBuf {
        self.data_dir.join("wellness_hub.db")
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.metrics_latency, Duration::from_millis(500));
        assert_eq!(config.default_sqlite_path(), PathBuf::from("data/wellness_hub.db"));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("DATA_DIR", "/var/lib/wellness"),
            ("APP_ENV", "production"),
            ("METRICS_SIMULATED_LATENCY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "production");
        assert_eq!(config.metrics_latency, Duration::ZERO);
        assert_eq!(
            config.default_sqlite_path(),
            PathBuf::from("/var/lib/wellness/wellness_hub.db")
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
