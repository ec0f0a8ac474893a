use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::utils::get_env_with_prefix;
use crate::webhooks::MalformedPayloadPolicy;

/// Main configuration for the intake service
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Persona webhook settings
///
/// The secret is never serialized and never printed by `Debug`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersonaConfig {
    #[serde(skip)]
    pub webhook_secret: Option<SecretString>,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
    #[serde(default)]
    pub malformed_policy: MalformedPayloadPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
}

/// Fraud-detection (Sift) settings. Scoring is disabled without an API key.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskConfig {
    #[serde(skip)]
    pub sift_api_key: Option<SecretString>,
    #[serde(default = "default_sift_endpoint")]
    pub sift_endpoint: String,
    #[serde(default = "default_risk_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            webhook_path: default_webhook_path(),
            malformed_policy: MalformedPayloadPolicy::default(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            sift_api_key: None,
            sift_endpoint: default_sift_endpoint(),
            timeout_seconds: default_risk_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_webhook_path() -> String {
    "/webhooks/persona".to_string()
}

fn default_sift_endpoint() -> String {
    "https://api.sift.com/v205/events".to_string()
}

fn default_risk_timeout() -> u64 {
    10
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.persona.webhook_secret = Some(SecretString::from(secret.into()));
        self
    }

    pub fn with_webhook_path(mut self, path: impl Into<String>) -> Self {
        self.config.persona.webhook_path = path.into();
        self
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPayloadPolicy) -> Self {
        self.config.persona.malformed_policy = policy;
        self
    }

    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database.url = Some(url.into());
        self
    }

    pub fn with_sift_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.risk.sift_api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Load configuration from environment variables with IDV_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = get_env_with_prefix("PORT") {
            if let Ok(p) = port.parse() {
                self.config.server.port = p;
            }
        }
        if let Some(max_body_size) = get_env_with_prefix("MAX_BODY_SIZE") {
            if let Ok(size) = max_body_size.parse() {
                self.config.server.max_body_size = size;
            }
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        if let Some(secret) = get_env_with_prefix("PERSONA_WEBHOOK_SECRET") {
            self.config.persona.webhook_secret = Some(SecretString::from(secret));
        }
        if let Some(path) = get_env_with_prefix("PERSONA_WEBHOOK_PATH") {
            self.config.persona.webhook_path = path;
        }
        if let Some(policy) = get_env_with_prefix("PERSONA_MALFORMED_POLICY") {
            match policy.parse() {
                Ok(p) => self.config.persona.malformed_policy = p,
                Err(_) => tracing::warn!(
                    value = %policy,
                    "Ignoring unknown PERSONA_MALFORMED_POLICY, expected 'retry' or 'reject'"
                ),
            }
        }

        if let Some(url) = get_env_with_prefix("DATABASE_URL") {
            self.config.database.url = Some(url);
        }

        if let Some(key) = get_env_with_prefix("SIFT_API_KEY") {
            self.config.risk.sift_api_key = Some(SecretString::from(key));
        }
        if let Some(endpoint) = get_env_with_prefix("SIFT_ENDPOINT") {
            self.config.risk.sift_endpoint = endpoint;
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if the server address, log level, port, webhook path
    /// or webhook secret is invalid.
    pub fn build(self) -> crate::error::Result<Config> {
        self.config.server.addr().map_err(|e| {
            crate::error::IntakeError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                self.config.server.host, self.config.server.port, e
            ))
        })?;

        if self.config.server.port == 0 {
            return Err(crate::error::IntakeError::bad_request(
                "Server port must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(crate::error::IntakeError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if !self.config.persona.webhook_path.starts_with('/') {
            return Err(crate::error::IntakeError::bad_request(format!(
                "Webhook path must start with '/': {}",
                self.config.persona.webhook_path
            )));
        }

        match &self.config.persona.webhook_secret {
            Some(secret) if !secret.expose_secret().is_empty() => {}
            _ => {
                return Err(crate::error::IntakeError::bad_request(
                    "Persona webhook secret is required",
                ));
            }
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
