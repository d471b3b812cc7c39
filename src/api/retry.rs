//! Retry middleware honouring UptimeRobot rate limits
//!
//! Works like `reqwest_retry::RetryTransientMiddleware` with one addition:
//! every response passes through the rate-limit waiter before the retry
//! decision, so a `retry-after` delay is always served in full.

use std::time::SystemTime;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{
    default_on_request_failure, default_on_request_success, RetryDecision, RetryPolicy, Retryable,
};
use tracing::debug;

use super::rate_limit::wait_on_rate_limit;
use crate::config::RetryConfig;

/// Retries transient failures with exponential backoff after rate-limit waits
#[derive(Debug, Clone)]
pub struct RateLimitRetry {
    policy: ExponentialBackoff,
}

impl RateLimitRetry {
    pub fn new(config: &RetryConfig) -> Self {
        // retry_bounds panics when min exceeds max
        let max_backoff = config.max_backoff.max(config.min_backoff);
        let policy = ExponentialBackoff::builder()
            .retry_bounds(config.min_backoff, max_backoff)
            .build_with_max_retries(config.max_retries);

        Self { policy }
    }
}

/// Transient means retryable: connection errors, timeouts, 408, 429 and 5xx
fn classify(result: &reqwest_middleware::Result<Response>) -> Option<Retryable> {
    match result {
        Ok(response) => default_on_request_success(response),
        Err(err) => default_on_request_failure(err),
    }
}

#[async_trait::async_trait]
impl Middleware for RateLimitRetry {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let start_time = SystemTime::now();
        let mut past_retries = 0;

        loop {
            let attempt = req.try_clone().ok_or_else(|| {
                reqwest_middleware::Error::Middleware(anyhow::anyhow!(
                    "request body is not cloneable, cannot retry"
                ))
            })?;

            let result = next.clone().run(attempt, extensions).await;
            wait_on_rate_limit(result.as_ref().ok()).await;

            if !matches!(classify(&result), Some(Retryable::Transient)) {
                return result;
            }

            match self.policy.should_retry(start_time, past_retries) {
                RetryDecision::Retry { execute_after } => {
                    let backoff = execute_after
                        .duration_since(SystemTime::now())
                        .unwrap_or_default();
                    debug!(
                        retry = past_retries + 1,
                        ?backoff,
                        "Retrying UptimeRobot request"
                    );
                    tokio::time::sleep(backoff).await;
                    past_retries += 1;
                }
                RetryDecision::DoNotRetry => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_tolerates_inverted_bounds() {
        let config = RetryConfig {
            min_backoff: Duration::from_secs(5),
            max_backoff: Duration::from_secs(1),
            ..RetryConfig::default()
        };

        let retry = RateLimitRetry::new(&config);
        let now = SystemTime::now();

        assert!(matches!(
            retry.policy.should_retry(now, 0),
            RetryDecision::Retry { .. }
        ));
        assert!(matches!(
            retry.policy.should_retry(now, config.max_retries),
            RetryDecision::DoNotRetry
        ));
    }

    #[test]
    fn test_classify_rate_limit_and_server_errors_as_transient() {
        for status in [429, 500, 502, 503, 504] {
            let response = Response::from(
                http::Response::builder()
                    .status(status)
                    .body(Vec::<u8>::new())
                    .expect("valid response"),
            );

            assert!(
                matches!(classify(&Ok(response)), Some(Retryable::Transient)),
                "status {status} should be retried"
            );
        }
    }

    #[test]
    fn test_classify_success_and_client_errors_as_final() {
        let ok = Response::from(
            http::Response::builder()
                .status(200)
                .body(Vec::<u8>::new())
                .expect("valid response"),
        );
        let not_found = Response::from(
            http::Response::builder()
                .status(404)
                .body(Vec::<u8>::new())
                .expect("valid response"),
        );

        assert!(classify(&Ok(ok)).is_none());
        assert!(matches!(classify(&Ok(not_found)), Some(Retryable::Fatal)));
    }
}
