//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `RECIPE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `RECIPE_HOST` - Bind address (default: 127.0.0.1)
//! - `RECIPE_PORT` - Listen port (default: 8000)
//! - `RECIPE_MEDIA_ROOT` - Directory for uploaded files (default: media)
//! - `RECIPE_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Default request body limit for image uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory that holds uploaded media, served under `/media`
    pub media_root: PathBuf,
    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sentry_dsn = self.sentry_dsn.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("media_root", &self.media_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("sentry_dsn", &sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ApiConfig {
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

        let database_url = get_database_url("RECIPE_DATABASE_URL")?;
        let host = parse_env("RECIPE_HOST", "127.0.0.1")?;
        let port = parse_env("RECIPE_PORT", "8000")?;
        let media_root = PathBuf::from(get_env_or_default("RECIPE_MEDIA_ROOT", "media"));
        let max_upload_bytes = parse_env(
            "RECIPE_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )?;

        Ok(Self {
            database_url,
            host,
            port,
            media_root,
            max_upload_bytes,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for running without external services: no database
    /// URL, an ephemeral port on localhost, and the given media root.
    #[must_use]
    pub fn local(media_root: impl Into<PathBuf>) -> Self {
        Self {
            database_url: SecretString::from(String::new()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            media_root: media_root.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
