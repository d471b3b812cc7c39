//! Fingerprinted response cache on disk
//!
//! Each request `(endpoint, params)` maps to one file named after the hex
//! SHA-512 of the endpoint bytes followed by the params bytes. The file holds
//! the raw response body and its modification time is the freshness clock.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use directories::BaseDirs;
use sha2::{Digest, Sha512};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Subdirectory of the user cache directory holding cached responses
pub const CACHE_DIR_NAME: &str = "terraform-uptimerobot";

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// Errors resolving a cache path
///
/// Callers treat these as a cache miss and go to the network.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No home directory, so no platform cache directory
    #[error("Could not determine the user cache directory")]
    NoCacheDir,

    /// Creating the cache directory failed
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raw response bytes read back from a fresh cache entry
#[derive(Debug, Clone, PartialEq)]
pub struct CachedBody {
    /// Bytes exactly as received from the API
    pub bytes: Bytes,
    /// Last modification time of the entry
    pub cached_at: DateTime<Utc>,
}

/// Resolves cache entry paths under one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a store under the platform user cache directory
    ///
    /// Uses `~/.cache/terraform-uptimerobot/` on Linux and the equivalent
    /// location elsewhere, so entries are shared with the Terraform provider.
    pub fn new() -> Result<Self, CacheError> {
        let base_dirs = BaseDirs::new().ok_or(CacheError::NoCacheDir)?;
        Ok(Self {
            cache_dir: base_dirs.cache_dir().join(CACHE_DIR_NAME),
        })
    }

    /// Creates a store with a custom cache directory
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Hex SHA-512 over `endpoint` then `params`, with no separator
    ///
    /// `("ab", "c")` and `("a", "bc")` therefore share a fingerprint. The
    /// layout is kept so existing provider cache files stay valid.
    pub fn fingerprint(endpoint: &str, params: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(endpoint.as_bytes());
        hasher.update(params.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Ensures the cache directory exists with owner/group-only permissions
    fn ensure_dir(&self) -> Result<(), CacheError> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }

        builder
            .create(&self.cache_dir)
            .map_err(|source| CacheError::CreateDir {
                path: self.cache_dir.clone(),
                source,
            })
    }

    /// Returns the cache file path for a request, creating the directory if needed
    pub fn path_for(&self, endpoint: &str, params: &str) -> Result<PathBuf, CacheError> {
        self.ensure_dir()?;
        Ok(self.cache_dir.join(Self::fingerprint(endpoint, params)))
    }
}

/// Whether an entry modified at `modified` is still fresh at `now`
///
/// Fresh means strictly newer than `now - ttl_secs`. A TTL of zero or less
/// is never fresh.
pub fn is_fresh(modified: SystemTime, now: SystemTime, ttl_secs: i64) -> bool {
    if ttl_secs <= 0 {
        return false;
    }

    match now.checked_sub(Duration::from_secs(ttl_secs as u64)) {
        Some(cutoff) => modified > cutoff,
        None => true,
    }
}

/// Reads a cache entry if it exists and is within the TTL window
///
/// Missing, stale and unreadable entries all return `None`. Stale files are
/// left in place for the next write to replace.
pub fn read_fresh(path: &Path, ttl_secs: i64) -> Option<CachedBody> {
    read_fresh_at(path, ttl_secs, SystemTime::now())
}

fn read_fresh_at(path: &Path, ttl_secs: i64, now: SystemTime) -> Option<CachedBody> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    if !is_fresh(modified, now, ttl_secs) {
        debug!(path = %path.display(), "Cache entry is stale");
        return None;
    }

    match fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), "Cache hit");
            Some(CachedBody {
                bytes: Bytes::from(bytes),
                cached_at: DateTime::<Utc>::from(modified),
            })
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to read cache entry");
            None
        }
    }
}

/// Replaces the entry at `path` with `bytes`
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the entry, so readers see either the old or the new body.
/// Failures are logged and swallowed; a failed write only costs a later miss.
pub fn write(path: &Path, bytes: &[u8]) {
    if let Err(err) = try_write(path, bytes) {
        warn!(path = %path.display(), error = %err, "Failed to write cache entry");
    }
}

fn try_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
    }

    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
