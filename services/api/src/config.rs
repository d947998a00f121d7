//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// Session lifetimes beyond a year are rejected at startup.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub llm_api_key: String,
    pub llm_api_base: String,
    pub summary_model: String,
    pub comparison_model: String,
    pub max_upload_bytes: usize,
    pub cors_origin: String,
}

// Keeps the signing secret and API key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("llm_api_base", &self.llm_api_base)
            .field("summary_model", &self.summary_model)
            .field("comparison_model", &self.comparison_model)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("cors_origin", &self.cors_origin)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        let token_ttl_secs = parse_or("TOKEN_TTL_SECS", lookup("TOKEN_TTL_SECS"), 3600i64)?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TTL_SECS".to_string(),
                format!("must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
            ));
        }

        // --- Load API Keys ---
        let llm_api_key = lookup("LLM_API_KEY")
            .or_else(|| lookup("GROQ_API_KEY"))
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("LLM_API_KEY".to_string()))?;

        // --- Load Adapter-specific Settings ---
        let llm_api_base = lookup("LLM_API_BASE")
            .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string());
        let summary_model =
            lookup("SUMMARY_MODEL").unwrap_or_else(|| "llama-3.3-70b-versatile".to_string());
        let comparison_model =
            lookup("COMPARISON_MODEL").unwrap_or_else(|| "llama-3.3-70b-versatile".to_string());

        let max_upload_bytes =
            parse_or("MAX_UPLOAD_BYTES", lookup("MAX_UPLOAD_BYTES"), 10 * 1024 * 1024usize)?;
        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            jwt_secret,
            token_ttl_secs,
            llm_api_key,
            llm_api_base,
            summary_model,
            comparison_model,
            max_upload_bytes,
            cors_origin,
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}
