//! chatgate configuration management
//!
//! Configuration comes from environment variables, an optional TOML file,
//! or both (environment wins), with defaults suitable for local development.

use crate::validation::PasswordPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Signing key used when `SECRET` is not set. Never acceptable in production.
pub const DEV_SECRET: &str = "development-secret-key-change-in-production";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Password strength rules applied at sign-up
    pub password_policy: PasswordPolicy,

    /// Password hashing cost parameters
    pub hasher: HasherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognised keys: `HOST`, `PORT`, `ORIGIN`, `SECRET`, `EXPIRATION`
    /// (milliseconds), `TOKEN_ISSUER`, `LOG_LEVEL`, `LOG_FORMAT`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_value("PORT", port)?;
        }
        if let Some(origin) = lookup("ORIGIN") {
            self.server.origin = origin;
        }

        // Session tokens
        if let Some(secret) = lookup("SECRET") {
            self.auth.secret = secret;
        }
        if let Some(expiration) = lookup("EXPIRATION") {
            self.auth.expiration_ms = parse_value("EXPIRATION", expiration)?;
        }
        if let Some(issuer) = lookup("TOKEN_ISSUER") {
            self.auth.issuer = issuer;
        }

        // Logging
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.json_format = match format.to_ascii_lowercase().as_str() {
                "json" => true,
                "pretty" | "text" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOG_FORMAT".to_string(),
                        value: format,
                    })
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.is_empty() {
            return Err(ConfigError::MissingRequired("SECRET".to_string()));
        }
        if self.auth.expiration_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EXPIRATION".to_string(),
                value: "0".to_string(),
            });
        }
        if self.password_policy.min_length > self.password_policy.max_length {
            return Err(ConfigError::InvalidValue {
                key: "password_policy.min_length".to_string(),
                value: self.password_policy.min_length.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origin (credentials are allowed for it)
    pub origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC signing key
    #[serde(skip_serializing)]
    pub secret: String,

    /// Token and cookie lifetime in milliseconds (default: one day)
    pub expiration_ms: u64,

    /// Token issuer claim
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiration_ms: 24 * 60 * 60 * 1000,
            issuer: "chatgate".to_string(),
        }
    }
}

impl AuthConfig {
    /// True when no real signing key was configured
    pub fn uses_dev_secret(&self) -> bool {
        self.secret == DEV_SECRET
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[redacted]")
            .field("expiration_ms", &self.expiration_ms)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,

    /// Iterations
    pub time_cost: u32,

    /// Lanes
    pub parallelism: u32,

    /// Digest length in bytes
    pub output_len: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MB
            time_cost: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
