//! Configuration management for the scheduling core

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Which booking backend implementation the binary talks to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Http,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgendaConfig {
    /// Number of per-day reservation fetches the week view may run at once.
    /// 1 keeps them strictly sequential.
    pub week_fetch_concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub agenda: AgendaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. AGENDA__BACKEND__BASE_URL
            .add_source(
                Environment::with_prefix("AGENDA")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("backend.base_url", env::var("BOOKING_API_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Http,
            base_url: "http://localhost:8080/api/v1".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            week_fetch_concurrency: 1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_week_fetch_sequential() {
        let config = AppConfig::default();
        assert_eq!(config.agenda.week_fetch_concurrency, 1);
        assert_eq!(config.backend.kind, BackendKind::Http);
        assert_eq!(config.backend.timeout_secs, 15);
    }

    #[test]
    fn test_partial_source_falls_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("backend.kind", "memory")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert_eq!(config.logging.level, "info");
    }
}
