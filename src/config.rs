//! Client configuration
//!
//! [`ClientConfig`] is built once when the surrounding tool is configured and
//! never changes afterwards. Defaults follow the UptimeRobot v2 API: one hour
//! of response caching and up to ten retries on transient failures.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ApiError;

/// Base URL of the UptimeRobot v2 API
pub const DEFAULT_BASE_URL: &str = "https://api.uptimerobot.com/v2/";

/// Cache time-to-live used when none is configured, in seconds
pub const DEFAULT_CACHE_TTL_SECS: i64 = 3600;

/// Retries after the first attempt before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "UPTIMEROBOT_API_KEY";

/// Environment variable holding the cache TTL in seconds
pub const CACHE_TTL_ENV: &str = "UPTIMEROBOT_CACHE_TTL";

/// Retry behaviour of the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Shortest backoff between attempts
    pub min_backoff: Duration,
    /// Longest backoff between attempts
    pub max_backoff: Duration,
    /// Timeout of a single attempt
    pub request_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration of an [`crate::api::ApiClient`]
///
/// The API key is never serialized and is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Main or read-only UptimeRobot API key
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Cache time-to-live in seconds; zero or negative disables cache reads
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: i64,
    /// API base URL, endpoints are joined onto it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
    /// Overrides the platform cache directory
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_cache_ttl() -> i64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("cache_ttl", &self.cache_ttl)
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("cache_dir", &self.cache_dir)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with default TTL, base URL and retry policy
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cache_ttl: DEFAULT_CACHE_TTL_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig::default(),
            cache_dir: None,
        }
    }

    /// Reads `UPTIMEROBOT_API_KEY` and the optional `UPTIMEROBOT_CACHE_TTL`
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from any variable source
    ///
    /// # Returns
    /// * `Err(ApiError::Config)` if the API key is missing or the TTL is not an integer
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ApiError::Config(format!("{API_KEY_ENV} is not set")))?;

        let mut config = Self::new(api_key);
        if let Some(raw) = lookup(CACHE_TTL_ENV) {
            config.cache_ttl = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{CACHE_TTL_ENV} must be an integer, got '{raw}'"))
            })?;
        }

        Ok(config)
    }

    pub fn with_cache_ttl(mut self, cache_ttl: i64) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }
}
