//! UptimeRobot API client library
//!
//! Authenticated form-encoded calls to the UptimeRobot v2 API with
//! rate-limit backoff, envelope decoding and an optional disk cache.
//! The CLI and logging modules are exposed for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod logging;

pub use api::{ApiClient, ApiError, Envelope};
pub use config::{ClientConfig, RetryConfig};
