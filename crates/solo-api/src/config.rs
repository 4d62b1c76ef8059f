//! API configuration.

use std::time::Duration;

use thiserror::Error;

/// Session token lifetime.
pub const TOKEN_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration errors detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// HMAC secret for session tokens
    pub token_secret: String,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// Expose Prometheus metrics
    pub metrics_enabled: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            token_secret: String::new(),
            token_ttl: TOKEN_TTL,
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let token_secret = get("SECRET_TOKEN")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SECRET_TOKEN"))?;

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => defaults.port,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            cors_origins: get("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_size: get("MAX_BODY_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: get("ENVIRONMENT")
                .or_else(|| get("NODE_ENV"))
                .unwrap_or(defaults.environment),
            token_secret,
            token_ttl: defaults.token_ttl,
            metrics_enabled: get("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
