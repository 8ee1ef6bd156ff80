//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ANIMART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ANIMART_TOKEN_SECRET` - Session token signing key (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ANIMART_HOST` - Bind address (default: 127.0.0.1)
//! - `ANIMART_PORT` - Listen port (default: 3000)
//! - `ANIMART_TOKEN_TTL_SECS` - Session token lifetime (default: 3600)
//! - `ANIMART_ARGON2_MEMORY_KIB` - Argon2id memory cost (default: argon2 crate default)
//! - `ANIMART_ARGON2_ITERATIONS` - Argon2id time cost (default: argon2 crate default)
//! - `ANIMART_ARGON2_PARALLELISM` - Argon2id lanes (default: argon2 crate default)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use chrono::TimeDelta;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::PasswordPolicy;
use crate::services::session::DEFAULT_TOKEN_TTL_SECS;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Upper bound on the token lifetime: 30 days.
const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "superkey",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session token signing key
    pub token_secret: SecretString,
    /// Session token lifetime
    pub token_ttl: TimeDelta,
    /// Argon2id cost parameters for new password hashes
    pub password_policy: PasswordPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ANIMART_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("ANIMART_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("ANIMART_PORT", "3000")?;

        let token_secret = get_required_secret("ANIMART_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "ANIMART_TOKEN_SECRET")?;

        let token_ttl = token_ttl_from_secs(
            parse_env_or_default::<i64>(
                "ANIMART_TOKEN_TTL_SECS",
                &DEFAULT_TOKEN_TTL_SECS.to_string(),
            )?,
            "ANIMART_TOKEN_TTL_SECS",
        )?;

        let password_policy = password_policy_from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            token_secret,
            token_ttl,
            password_policy,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
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

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to the generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, or a default when it is unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_owned());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Parse an optional environment variable.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
        .transpose()
}

/// Build the token lifetime, rejecting zero, negative, and absurd values.
fn token_ttl_from_secs(secs: i64, var_name: &str) -> Result<TimeDelta, ConfigError> {
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_owned(),
            format!("must be between 1 and {MAX_TOKEN_TTL_SECS} seconds"),
        ));
    }
    Ok(TimeDelta::seconds(secs))
}

/// Build the Argon2id policy; unset variables keep the crate defaults.
fn password_policy_from_env() -> Result<PasswordPolicy, ConfigError> {
    let defaults = PasswordPolicy::default();
    let memory = parse_optional_env::<u32>("ANIMART_ARGON2_MEMORY_KIB")?
        .unwrap_or_else(|| defaults.params().m_cost());
    let iterations = parse_optional_env::<u32>("ANIMART_ARGON2_ITERATIONS")?
        .unwrap_or_else(|| defaults.params().t_cost());
    let parallelism = parse_optional_env::<u32>("ANIMART_ARGON2_PARALLELISM")?
        .unwrap_or_else(|| defaults.params().p_cost());

    PasswordPolicy::new(memory, iterations, parallelism).map_err(|e| {
        ConfigError::InvalidEnvVar("ANIMART_ARGON2_*".to_owned(), e.to_string())
    })
}

/// Validate length, placeholder patterns, and entropy of the signing key.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    validate_secret_strength(value, var_name)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
