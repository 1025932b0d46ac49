//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the store is
//! opened.
//!
//! ## Store Backends
//!
//! ```bash
//! # Single process, nothing to run (default)
//! export STORE_BACKEND="memory"
//!
//! # Shared Redis, full URL
//! export STORE_BACKEND="redis"
//! export REDIS_URL="redis://localhost:6379/0"
//!
//! # Shared Redis, individual components
//! export REDIS_HOST="localhost"
//! export REDIS_PORT="6379"
//! export REDIS_PASSWORD=""
//! export REDIS_DB="0"
//! ```
//!
//! ## Optional Variables
//!
//! - `DOMAIN` - Public domain of short links (default: `localhost:3000`)
//! - `DEFAULT_EXPIRY_SECS` - Record lifetime when a request names none (default: 86400)
//! - `MAX_EXPIRY_SECS` - Longest lifetime a request may ask for (default: 31536000)
//! - `API_QUOTA` - Shorten requests per client per window (default: 10)
//! - `RATE_LIMIT_WINDOW_SECS` - Quota window (default: 1800)
//! - `CODE_LENGTH` / `CODE_ALPHABET` - Generated code shape (default: 7 unambiguous symbols)
//! - `CODE_MAX_ATTEMPTS` - Collision retries (default: 5)
//! - `REDIS_CONNECT_TIMEOUT_MS` / `REDIS_COMMAND_TIMEOUT_MS` - Redis bounds (default: 2000 / 250)
//! - `SWEEP_INTERVAL_SECS` - Memory store purge interval (default: 60)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use crate::application::services::ShortenerSettings;
use crate::infrastructure::store::RedisStoreConfig;
use crate::utils::code_generator::{CodeAlphabet, DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH};
use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Which [`KeyStore`](crate::domain::repositories::KeyStore) backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => anyhow::bail!("STORE_BACKEND must be 'memory' or 'redis', got '{}'", other),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Redis => f.write_str("redis"),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub redis_url: Option<String>,
    pub redis_connect_timeout_ms: u64,
    /// Upper bound on a single Redis command; a slower command fails the request.
    pub redis_command_timeout_ms: u64,
    /// Domain short links are published under. Links back to it are refused.
    pub public_domain: String,
    pub default_expiry_secs: u64,
    /// Requests asking for a longer expiry are rejected.
    pub max_expiry_secs: u64,
    pub api_quota: u64,
    pub rate_limit_window_secs: u64,
    pub code_length: usize,
    pub code_alphabet: String,
    pub code_max_attempts: usize,
    /// How often the memory store drops expired entries. Ignored for Redis.
    pub sweep_interval_secs: u64,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORE_BACKEND` names an unknown backend.
    pub fn from_env() -> Result<Self> {
        let store_backend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()
            .context("Failed to load store configuration")?;

        let redis_url = Self::load_redis_url();

        let public_domain = env::var("DOMAIN").unwrap_or_else(|_| "localhost:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let code_alphabet =
            env::var("CODE_ALPHABET").unwrap_or_else(|_| DEFAULT_ALPHABET.to_string());

        Ok(Self {
            store_backend,
            redis_url,
            redis_connect_timeout_ms: parse_var("REDIS_CONNECT_TIMEOUT_MS", 2000),
            redis_command_timeout_ms: parse_var("REDIS_COMMAND_TIMEOUT_MS", 250),
            public_domain,
            default_expiry_secs: parse_var("DEFAULT_EXPIRY_SECS", 86_400),
            max_expiry_secs: parse_var("MAX_EXPIRY_SECS", 31_536_000),
            api_quota: parse_var("API_QUOTA", 10),
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECS", 1800),
            code_length: parse_var("CODE_LENGTH", DEFAULT_CODE_LENGTH),
            code_alphabet,
            code_max_attempts: parse_var("CODE_MAX_ATTEMPTS", 5),
            sweep_interval_secs: parse_var("SWEEP_INTERVAL_SECS", 60),
            log_level,
            log_format,
        })
    }

    /// `REDIS_URL` if set, else a URL assembled from `REDIS_HOST` and friends.
    fn load_redis_url() -> Option<String> {
        env::var("REDIS_URL").ok().or_else(|| {
            let host = env::var("REDIS_HOST").ok()?;
            let password = env::var("REDIS_PASSWORD").ok();
            Some(redis_url_from_parts(
                &host,
                &env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string()),
                &env::var("REDIS_DB").unwrap_or_else(|_| "0".to_string()),
                password.as_deref(),
            ))
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `log_format` is not `text` or `json`
    /// - the Redis backend is selected without a Redis URL, or the URL is malformed
    /// - a timeout, window, expiry, quota or attempt budget is zero
    /// - the maximum expiry is shorter than the default one
    /// - the code alphabet is invalid or too weak for `code_length`
    pub fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if self.store_backend == StoreBackend::Redis && self.redis_url.is_none() {
            anyhow::bail!("STORE_BACKEND=redis requires REDIS_URL or REDIS_HOST");
        }

        if let Some(ref redis_url) = self.redis_url
            && !redis_url.starts_with("redis://")
            && !redis_url.starts_with("rediss://")
        {
            anyhow::bail!(
                "REDIS_URL must start with 'redis://' or 'rediss://', got '{}'",
                mask_connection_string(redis_url)
            );
        }

        if self.redis_connect_timeout_ms == 0 || self.redis_command_timeout_ms == 0 {
            anyhow::bail!("Redis timeouts must be greater than 0");
        }

        if self.public_domain.trim().is_empty() {
            anyhow::bail!("DOMAIN must not be empty");
        }

        if self.default_expiry_secs == 0 {
            anyhow::bail!("DEFAULT_EXPIRY_SECS must be greater than 0");
        }

        if self.max_expiry_secs < self.default_expiry_secs {
            anyhow::bail!(
                "MAX_EXPIRY_SECS ({}) must not be below DEFAULT_EXPIRY_SECS ({})",
                self.max_expiry_secs,
                self.default_expiry_secs
            );
        }

        if self.api_quota == 0 {
            anyhow::bail!("API_QUOTA must be at least 1");
        }

        if self.rate_limit_window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be greater than 0");
        }

        if self.code_max_attempts == 0 || self.code_max_attempts > 100 {
            anyhow::bail!(
                "CODE_MAX_ATTEMPTS must be between 1 and 100, got {}",
                self.code_max_attempts
            );
        }

        if self.sweep_interval_secs == 0 {
            anyhow::bail!("SWEEP_INTERVAL_SECS must be greater than 0");
        }

        self.code_alphabet()?;

        Ok(())
    }

    /// Builds the generated-code alphabet.
    ///
    /// # Errors
    ///
    /// Returns an error if `CODE_ALPHABET` / `CODE_LENGTH` are rejected by
    /// [`CodeAlphabet::new`].
    pub fn code_alphabet(&self) -> Result<CodeAlphabet> {
        CodeAlphabet::new(&self.code_alphabet, self.code_length)
            .context("Invalid CODE_ALPHABET / CODE_LENGTH")
    }

    /// Builds the service policy from this configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::code_alphabet`].
    pub fn shortener_settings(&self) -> Result<ShortenerSettings> {
        Ok(ShortenerSettings {
            public_domain: self.public_domain.clone(),
            default_expiry: Duration::from_secs(self.default_expiry_secs),
            max_expiry: Duration::from_secs(self.max_expiry_secs),
            max_quota: self.api_quota,
            rate_window: Duration::from_secs(self.rate_limit_window_secs),
            alphabet: self.code_alphabet()?,
            max_attempts: self.code_max_attempts,
        })
    }

    /// Redis connection settings, if a Redis URL is configured.
    pub fn redis_store_config(&self) -> Option<RedisStoreConfig> {
        self.redis_url.as_ref().map(|url| RedisStoreConfig {
            url: url.clone(),
            connect_timeout: Duration::from_millis(self.redis_connect_timeout_ms),
            command_timeout: Duration::from_millis(self.redis_command_timeout_ms),
        })
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Store backend: {}", self.store_backend);

        if let Some(ref redis_url) = self.redis_url {
            tracing::info!(
                "  Redis: {} (command timeout {}ms)",
                mask_connection_string(redis_url),
                self.redis_command_timeout_ms
            );
        }

        tracing::info!("  Public domain: {}", self.public_domain);
        tracing::info!(
            "  Expiry: {}s default, {}s max",
            self.default_expiry_secs,
            self.max_expiry_secs
        );
        tracing::info!(
            "  Rate limit: {} per {}s",
            self.api_quota,
            self.rate_limit_window_secs
        );
        tracing::info!(
            "  Codes: length {} over {} symbols",
            self.code_length,
            self.code_alphabet.chars().count()
        );
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// `redis://host:port/db`, with the password percent-encoded into the userinfo.
/// An empty password means no authentication.
fn redis_url_from_parts(host: &str, port: &str, db: &str, password: Option<&str>) -> String {
    let plain = format!("redis://{}:{}/{}", host, port, db);
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return plain;
    };

    if let Ok(mut url) = Url::parse(&plain)
        && url.set_password(Some(password)).is_ok()
    {
        return url.to_string();
    }
    format!("redis://:{}@{}:{}/{}", password, host, port, db)
}

/// Replaces the password of a connection URL with `***` for logging.
fn mask_connection_string(raw: &str) -> String {
    if let Ok(mut url) = Url::parse(raw)
        && url.password().is_some()
        && url.set_password(Some("***")).is_ok()
    {
        return url.to_string();
    }
    raw.to_string()
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if a variable is malformed or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
