//! Command-line interface parsing for the `uptimerobot` tool
//!
//! One invocation issues one API call, optionally through the disk cache,
//! and prints the decoded envelope as JSON.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{
    ClientConfig, RetryConfig, API_KEY_ENV, CACHE_TTL_ENV, DEFAULT_BASE_URL,
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_RETRIES,
};

/// Call the UptimeRobot v2 API
#[derive(Parser, Debug)]
#[command(name = "uptimerobot")]
#[command(about = "Call the UptimeRobot v2 API and print the JSON response")]
#[command(version)]
pub struct Cli {
    /// API endpoint, e.g. getMonitors or getAccountDetails
    pub endpoint: String,

    /// Form-encoded parameters, e.g. "monitors=123-456&logs=1"
    #[arg(default_value = "")]
    pub params: String,

    /// UptimeRobot API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: String,

    /// Serve the response from the disk cache while it is fresh
    #[arg(long)]
    pub cached: bool,

    /// Cache time-to-live in seconds; zero or less disables cache hits
    #[arg(long, env = CACHE_TTL_ENV, default_value_t = DEFAULT_CACHE_TTL_SECS, allow_negative_numbers = true)]
    pub cache_ttl: i64,

    /// Directory for cached responses instead of the platform cache directory
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Retries on rate limits and transient failures
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Shortest backoff between retries, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub min_backoff_ms: u64,

    /// Log requests and responses to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the client configuration these arguments describe
    pub fn to_config(&self) -> ClientConfig {
        let defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_retries: self.max_retries,
            min_backoff: Duration::from_millis(self.min_backoff_ms),
            max_backoff: defaults.max_backoff.max(Duration::from_millis(self.min_backoff_ms)),
            ..defaults
        };

        let config = ClientConfig::new(self.api_key.clone())
            .with_cache_ttl(self.cache_ttl)
            .with_base_url(self.base_url.clone())
            .with_retry(retry);

        match &self.cache_dir {
            Some(dir) => config.with_cache_dir(dir.clone()),
            None => config,
        }
    }
}
