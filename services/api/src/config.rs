//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables once at startup
//! and passed down explicitly; nothing reads the environment after that.
//! The `.env` file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// The deployment posture, controlling the CORS allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub environment: Environment,
    pub database_url: String,
    pub log_level: Level,
    /// Base URL of the external identity provider.
    pub identity_url: String,
    /// Service key sent alongside every identity-provider call.
    pub identity_service_key: String,
    pub openai_api_key: String,
    pub story_model: String,
    /// Allowed CORS origins, consulted only in the production posture.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure
    /// tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            Ok("development") | Err(_) => Environment::Development,
            Ok(other) => {
                return Err(ConfigError::InvalidValue(
                    "APP_ENV".to_string(),
                    format!("'{}' is not 'production' or 'development'", other),
                ))
            }
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Required External-Service Settings ---
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let identity_url = std::env::var("IDENTITY_PROVIDER_URL")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_PROVIDER_URL".to_string()))?;
        let identity_service_key = std::env::var("IDENTITY_SERVICE_KEY")
            .map_err(|_| ConfigError::MissingVar("IDENTITY_SERVICE_KEY".to_string()))?;
        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        // --- Load Optional Settings ---
        let story_model =
            std::env::var("STORY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        // In production the allow-list is the only thing letting the
        // frontend in; an empty one would silently block every origin.
        if environment.is_production() && cors_origins.is_empty() {
            return Err(ConfigError::MissingVar("CORS_ORIGINS".to_string()));
        }

        Ok(Self {
            bind_address,
            environment,
            database_url,
            log_level,
            identity_url,
            identity_service_key,
            openai_api_key,
            story_model,
            cors_origins,
        })
    }
}
