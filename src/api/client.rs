//! UptimeRobot API client handle
//!
//! [`ApiClient`] is cheap to clone; all clones share one transport, one
//! cache store and one lock, so network calls from the same client never run
//! concurrently no matter how many tasks hold it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use reqwest_middleware::Middleware;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::envelope::{decode, Envelope};
use super::error::ApiError;
use super::transport::Transport;
use crate::cache::{self, CacheStore};
use crate::config::ClientConfig;

/// Shared handle for calling the UptimeRobot API
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    transport: Transport,
    /// `None` when no cache directory could be determined
    cache: Option<CacheStore>,
    /// Serializes network calls
    lock: Mutex<()>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .field("cache", &self.inner.cache)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client for `api_key` caching responses for `cache_ttl` seconds
    pub fn new(api_key: impl Into<String>, cache_ttl: i64) -> Result<Self, ApiError> {
        Self::from_config(ClientConfig::new(api_key).with_cache_ttl(cache_ttl))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_middleware(config, Vec::new())
    }

    /// Creates a client with extra transport middleware, see [`Transport::with_middleware`]
    pub fn with_middleware(
        config: ClientConfig,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self, ApiError> {
        if config.api_key.is_empty() {
            return Err(ApiError::Config("API key must not be empty".to_string()));
        }

        let transport = Transport::with_middleware(&config, middleware)?;
        let cache = match &config.cache_dir {
            Some(dir) => Some(CacheStore::with_dir(dir.clone())),
            None => match CacheStore::new() {
                Ok(store) => Some(store),
                Err(err) => {
                    warn!(error = %err, "Response cache unavailable");
                    None
                }
            },
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                cache,
                lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> Option<&CacheStore> {
        self.inner.cache.as_ref()
    }

    /// Runs one network call while holding the client lock
    async fn make_call(&self, endpoint: &str, params: &str) -> Result<Bytes, ApiError> {
        let _guard = self.inner.lock.lock().await;
        self.inner.transport.post_form(endpoint, params).await
    }

    /// Calls `endpoint` with form-encoded `params` and decodes the envelope
    ///
    /// # Returns
    /// * `Ok(Envelope)` - The response with `stat == "ok"`
    /// * `Err(ApiError)` - Transport, status, decode or API-reported failure
    pub async fn call(&self, endpoint: &str, params: &str) -> Result<Envelope, ApiError> {
        let body = self.make_call(endpoint, params).await?;
        decode(&body)
    }

    /// Like [`ApiClient::call`], served from the disk cache while fresh
    ///
    /// # Behavior
    /// - A fresh entry is decoded and returned without touching the network
    /// - A fresh entry that is not valid JSON counts as a miss and is replaced
    /// - Otherwise the API is called and the body is cached once it decodes
    /// - Cache failures of any kind degrade to a live call
    pub async fn call_cachable(&self, endpoint: &str, params: &str) -> Result<Envelope, ApiError> {
        let cache_path = self.cache_path(endpoint, params);

        if let Some(path) = &cache_path {
            if let Some(cached) = cache::read_fresh(path, self.inner.config.cache_ttl) {
                match decode(&cached.bytes) {
                    Err(ApiError::Decode { source, .. }) => {
                        warn!(endpoint, error = %source, "Cached response is corrupt, calling API");
                    }
                    result => {
                        debug!(endpoint, cached_at = %cached.cached_at, "Serving response from cache");
                        return result;
                    }
                }
            }
        }

        let body = self.make_call(endpoint, params).await?;
        let envelope = decode(&body)?;

        if let Some(path) = &cache_path {
            cache::write(path, &body);
        }

        Ok(envelope)
    }

    fn cache_path(&self, endpoint: &str, params: &str) -> Option<PathBuf> {
        let store = self.inner.cache.as_ref()?;
        match store.path_for(endpoint, params) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(error = %err, "Cache path unavailable, calling API directly");
                None
            }
        }
    }
}
