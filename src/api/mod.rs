//! UptimeRobot v2 API client
//!
//! Requests are form-encoded POSTs authenticated with a static API key.
//! Responses are JSON envelopes whose `stat` field reports success.
//!
//! - [`ApiClient`] - Shared handle offering plain and cached calls
//! - [`Transport`] - Request construction and the retrying HTTP stack
//! - [`decode`] / [`Envelope`] - Envelope decoding and typed field access
//! - [`wait_on_rate_limit`] - `retry-after` backoff

mod client;
mod envelope;
mod error;
mod rate_limit;
mod retry;
mod transport;

pub use client::ApiClient;
pub use envelope::{decode, Envelope};
pub use error::ApiError;
pub use rate_limit::{retry_after, wait_on_rate_limit, RETRY_AFTER};
pub use retry::RateLimitRetry;
pub use transport::Transport;
