//! Builder configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BUILDER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `BUILDER_HOST` - Bind address (default: 127.0.0.1)
//! - `BUILDER_PORT` - Listen port (default: 3002)
//! - `REDIS_URL` - Redis connection string for the bundle-data cache.
//!   When unset, an in-process cache is used instead.
//! - `CACHE_TTL_SECS` - Expiry for cached entries (default: no expiry)
//! - `CACHE_TIMEOUT_MS` - Per-operation cache timeout (default: 250)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CACHE_TIMEOUT_MS: u64 = 250;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bundle builder application configuration.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bundle-data cache configuration
    pub cache: CacheConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Cache store configuration.
///
/// Implements `Debug` manually because the Redis URL may carry a password.
#[derive(Clone)]
pub struct CacheConfig {
    /// Redis connection URL; `None` selects the in-process store
    pub redis_url: Option<SecretString>,
    /// Expiry applied to every cached entry
    pub ttl: Option<Duration>,
    /// Upper bound on a single cache round-trip
    pub op_timeout: Duration,
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("ttl", &self.ttl)
            .field("op_timeout", &self.op_timeout)
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl: None,
            op_timeout: Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MS),
        }
    }
}

impl BuilderConfig {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`BuilderConfig::from_env`].
    pub fn from_lookup<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get_database_url(&env, "BUILDER_DATABASE_URL")?;
        let host = get_env_or_default(&env, "BUILDER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BUILDER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(&env, "BUILDER_PORT", "3002")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BUILDER_PORT".to_string(), e.to_string()))?;
        let cache = CacheConfig::from_lookup(&env)?;
        let sentry_dsn = env("SENTRY_DSN");
        let sentry_environment = env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            cache,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Get the socket address to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl CacheConfig {
    fn from_lookup<F>(env: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis_url = env("REDIS_URL")
            .filter(|url| !url.trim().is_empty())
            .map(SecretString::from);
        let ttl = parse_optional::<u64, _>(env, "CACHE_TTL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let op_timeout = parse_optional::<u64, _>(env, "CACHE_TIMEOUT_MS")?
            .map_or(Duration::from_millis(DEFAULT_CACHE_TIMEOUT_MS), Duration::from_millis);

        Ok(Self {
            redis_url,
            ttl,
            op_timeout,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url<F>(env: &F, primary_key: &str) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env(primary_key)
        .or_else(|| env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default<F>(env: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional variable, rejecting values that are present but malformed.
fn parse_optional<T, F>(env: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}
