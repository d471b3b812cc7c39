//! Disk cache for raw API responses
//!
//! Entries are keyed by a SHA-512 fingerprint of the request and expire by
//! file modification time. Every failure in this module is non-fatal: a
//! cache that cannot be read or written simply misses.

mod store;

pub use store::{is_fresh, read_fresh, write, CacheError, CacheStore, CachedBody, CACHE_DIR_NAME};
