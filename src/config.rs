//! Configuration management.
//!
//! Values are layered with figment, later sources winning:
//!
//! 1. built-in defaults
//! 2. the TOML file (`captioner.toml` unless overridden)
//! 3. `CAPTIONER_*` environment variables, `__` separating sections
//! 4. `CAPTIONING_SERVICE_URL`, which always wins for the service URL

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment override for the captioning service base URL.
pub const SERVICE_URL_ENV: &str = "CAPTIONING_SERVICE_URL";

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,

    /// Remote services this front end talks to
    pub service_urls: ServiceUrls,

    pub limits: LimitsConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceUrls {
    /// Base URL of the captioning service; `/caption` is appended per request
    pub captioning_service: String,
}

impl Default for ServiceUrls {
    fn default() -> Self {
        Self {
            captioning_service: DEFAULT_SERVICE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted request body on the upload route
    pub max_upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    pub level: String,

    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration, reading `path` if it exists.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Config = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAPTIONER_").split("__"))
            .merge(
                Env::raw()
                    .only(&[SERVICE_URL_ENV])
                    .map(|_| "service_urls.captioning_service".into()),
            )
    }

    /// Service base URL without a trailing slash.
    pub fn captioning_service_url(&self) -> &str {
        self.service_urls.captioning_service.trim_end_matches('/')
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be > 0".into()));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.max_upload_bytes must be > 0".into(),
            ));
        }

        let url = reqwest::Url::parse(self.captioning_service_url()).map_err(|e| {
            ConfigError::Validation(format!(
                "service_urls.captioning_service is not a valid URL: {e}"
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "service_urls.captioning_service must use http or https, got {}",
                url.scheme()
            )));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Validation(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        Ok(())
    }
}
