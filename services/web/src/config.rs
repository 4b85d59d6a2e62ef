//! services/web/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub log_file: PathBuf,
    pub secret_key: String,
    pub public_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub english_model: String,
    pub french_model: String,
    pub history_page_size: u32,
    pub confirmation_max_age_secs: i64,
    pub max_upload_bytes: usize,
    pub cookie_secure: bool,
    pub cors_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:summarizer.db?mode=rwc".to_string());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let log_file = lookup("LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("summarizer.log"));

        // --- Load Secrets ---
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("SECRET_KEY".to_string()))?;

        let public_base_url = lookup("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", bind_address))
            .trim_end_matches('/')
            .to_string();

        let openai_api_key = lookup("OPENAI_API_KEY");
        let openai_base_url = lookup("OPENAI_BASE_URL");

        // --- Load Model and Limit Settings ---
        let english_model = lookup("ENGLISH_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let french_model = lookup("FRENCH_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let history_page_size = parse_or(&lookup, "HISTORY_PAGE_SIZE", 5u32)?;
        if history_page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "HISTORY_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let confirmation_max_age_secs = parse_or(&lookup, "CONFIRMATION_MAX_AGE_SECS", 3600i64)?;
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?;
        let cookie_secure = parse_or(&lookup, "COOKIE_SECURE", false)?;
        let cors_origin = lookup("CORS_ORIGIN");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            log_file,
            secret_key,
            public_base_url,
            openai_api_key,
            openai_base_url,
            english_model,
            french_model,
            history_page_size,
            confirmation_max_age_secs,
            max_upload_bytes,
            cookie_secure,
            cors_origin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("SECRET_KEY", "s3cret")])).unwrap();
        assert_eq!(config.bind_address.to_string(), "127.0.0.1:5000");
        assert_eq!(config.database_url, "sqlite:summarizer.db?mode=rwc");
        assert_eq!(config.public_base_url, "http://127.0.0.1:5000");
        assert_eq!(config.history_page_size, 5);
        assert_eq!(config.confirmation_max_age_secs, 3600);
        assert!(!config.cookie_secure);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_secret_key_required() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "SECRET_KEY"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("HISTORY_PAGE_SIZE", "zero"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "HISTORY_PAGE_SIZE"));

        let err = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("HISTORY_PAGE_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(..)));

        let err = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("BIND_ADDRESS", "not-an-address"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v, _) if v == "BIND_ADDRESS"));
    }

    #[test]
    fn test_public_base_url_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("SECRET_KEY", "s3cret"),
            ("PUBLIC_BASE_URL", "https://summaries.example.com/"),
        ]))
        .unwrap();
        assert_eq!(config.public_base_url, "https://summaries.example.com");
    }
}
