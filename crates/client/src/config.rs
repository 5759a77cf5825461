//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIFFIN_API_BASE_URL` - Base URL of the backend REST API
//!
//! ## Optional
//! - `TIFFIN_API_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `TIFFIN_STORAGE_DIR` - Directory for the file storage backend; the
//!   in-memory backend is used when unset

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API, without a trailing slash.
    pub api_base_url: String,
    /// Timeout applied to every backend request.
    pub api_timeout: Duration,
    /// Directory for durable storage; `None` selects the in-memory backend.
    pub storage_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = normalize_base_url(get_required_env("TIFFIN_API_BASE_URL")?);
        let api_timeout = parse_timeout(
            "TIFFIN_API_TIMEOUT_SECS",
            &get_env_or_default("TIFFIN_API_TIMEOUT_SECS", "30"),
        )?;
        let storage_dir = get_optional_env("TIFFIN_STORAGE_DIR").map(PathBuf::from);

        Ok(Self {
            api_base_url,
            api_timeout,
            storage_dir,
        })
    }

    /// Build a configuration for a given base URL with defaults elsewhere.
    ///
    /// Interesting mainly for tests and embedders that manage their own
    /// environment.
    #[must_use]
    pub fn for_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url.into()),
            api_timeout: Duration::from_secs(30),
            storage_dir: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a timeout value in whole seconds.
fn parse_timeout(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Strip trailing slashes so endpoint paths can always be appended with `/`.
fn normalize_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
