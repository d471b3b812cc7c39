//! Rate-limit waiter
//!
//! UptimeRobot signals rate limiting with a `retry-after` header counted in
//! seconds. The retry middleware runs [`wait_on_rate_limit`] after every
//! response, before it decides whether to try again.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Response;
use tracing::{debug, warn};

/// Header carrying the rate-limit delay in seconds
pub const RETRY_AFTER: &str = "retry-after";

/// Reads the delay requested by a `retry-after` header
///
/// A missing header means no delay. Values that are not a non-negative
/// integer number of seconds (HTTP dates included) are logged and also
/// treated as no delay.
pub fn retry_after(headers: &HeaderMap) -> Duration {
    let Some(value) = headers.get(RETRY_AFTER) else {
        return Duration::ZERO;
    };

    let raw = value.to_str().unwrap_or_default().trim();
    match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(err) => {
            warn!(value = raw, error = %err, "Error parsing retry-after header");
            Duration::ZERO
        }
    }
}

/// Suspends the caller for the delay the response asks for
///
/// Does nothing when there is no response (the attempt failed before any
/// headers arrived).
pub async fn wait_on_rate_limit(response: Option<&Response>) {
    let Some(response) = response else {
        return;
    };

    let wait = retry_after(response.headers());
    if wait.is_zero() {
        return;
    }

    debug!(seconds = wait.as_secs(), status = %response.status(), "Got rate limit, sleeping");
    tokio::time::sleep(wait).await;
}
