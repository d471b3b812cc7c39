//! Form-encoded POST transport for the UptimeRobot v2 API

use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::StatusCode;
use reqwest_middleware::{ClientWithMiddleware, Middleware};
use tracing::debug;
use url::{form_urlencoded, Url};

use super::error::ApiError;
use super::retry::RateLimitRetry;
use crate::config::ClientConfig;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Issues authenticated requests and returns raw response bodies
pub struct Transport {
    client: ClientWithMiddleware,
    base_url: Url,
    api_key: String,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_middleware(config, Vec::new())
    }

    /// Creates a transport with extra middleware inside the retry layer
    ///
    /// Extra middleware sees every individual attempt.
    pub fn with_middleware(
        config: &ClientConfig,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self, ApiError> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let inner_client = reqwest::Client::builder()
            .timeout(config.retry.request_timeout)
            .build()?;

        let mut builder = reqwest_middleware::ClientBuilder::new(inner_client)
            .with(RateLimitRetry::new(&config.retry));
        for layer in middleware {
            builder = builder.with_arc(layer);
        }

        Ok(Self {
            client: builder.build(),
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Full URL for an endpoint such as `getMonitors`
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// `api_key=<key>&format=json&<params>`
    ///
    /// `params` is expected to be form-encoded already; the key is encoded here.
    pub fn form_body(&self, params: &str) -> String {
        let api_key: String = form_urlencoded::byte_serialize(self.api_key.as_bytes()).collect();
        let mut body = format!("api_key={api_key}&format=json");
        if !params.is_empty() {
            body.push('&');
            body.push_str(params);
        }
        body
    }

    /// POSTs to `endpoint` and returns the raw body of a `200 OK` response
    ///
    /// # Returns
    /// * `Ok(Bytes)` - The undecoded body
    /// * `Err(ApiError::Status)` - If the final attempt was not `200 OK`
    /// * `Err(ApiError::Request)` - If the request could not be completed after retries
    pub async fn post_form(&self, endpoint: &str, params: &str) -> Result<Bytes, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(endpoint, "Making request to UptimeRobot");

        let response = self
            .client
            .post(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(self.form_body(params))
            .send()
            .await?;

        let status = response.status();
        debug!(%status, headers = ?response.headers(), "Got response");
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(ApiError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(body = %String::from_utf8_lossy(&body), "Got body");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            min_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            request_timeout: Duration::from_secs(5),
        }
    }

    fn transport_for(server: &MockServer, max_retries: u32) -> Transport {
        let config = ClientConfig::new("u123-test")
            .with_base_url(format!("{}/v2", server.uri()))
            .with_retry(fast_retry(max_retries));
        Transport::new(&config).expect("transport")
    }

    #[test]
    fn test_endpoint_url_joins_base() {
        let transport = Transport::new(&ClientConfig::new("key")).expect("transport");

        assert_eq!(
            transport.endpoint_url("getMonitors").expect("url").as_str(),
            "https://api.uptimerobot.com/v2/getMonitors"
        );
        assert_eq!(
            transport.endpoint_url("/getMonitors").expect("url").as_str(),
            "https://api.uptimerobot.com/v2/getMonitors"
        );
    }

    #[test]
    fn test_form_body_layout() {
        let transport = Transport::new(&ClientConfig::new("u123-abc")).expect("transport");

        assert_eq!(
            transport.form_body("monitors=1-2&logs=1"),
            "api_key=u123-abc&format=json&monitors=1-2&logs=1"
        );
        assert_eq!(transport.form_body(""), "api_key=u123-abc&format=json");
    }

    #[test]
    fn test_form_body_encodes_api_key() {
        let transport = Transport::new(&ClientConfig::new("a&b=c")).expect("transport");

        assert_eq!(transport.form_body(""), "api_key=a%26b%3Dc&format=json");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = Transport::new(&ClientConfig::new("key").with_base_url("not a url"));

        assert!(matches!(result, Err(ApiError::Url(_))));
    }

    #[tokio::test]
    async fn test_post_form_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/getMonitors"))
            .and(header("cache-control", "no-cache"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(body_string("api_key=u123-test&format=json&monitors=42"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"stat":"ok"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let body = transport_for(&server, 0)
            .post_form("getMonitors", "monitors=42")
            .await
            .expect("call should succeed");

        assert_eq!(body.as_ref(), br#"{"stat":"ok"}"#);
    }

    #[tokio::test]
    async fn test_status_error_after_exhausting_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
            .expect(3)
            .mount(&server)
            .await;

        let err = transport_for(&server, 2)
            .post_form("getMonitors", "")
            .await
            .expect_err("call should fail");

        assert!(matches!(err, ApiError::Status { .. }));
        let message = err.to_string();
        assert!(message.contains("503"), "{message}");
        assert!(message.contains("maintenance window"), "{message}");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such endpoint"))
            .expect(1)
            .mount(&server)
            .await;

        let err = transport_for(&server, 5)
            .post_form("getNothing", "")
            .await
            .expect_err("call should fail");

        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_rate_limit_waits_then_retries() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"stat":"ok"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let start = std::time::Instant::now();
        let body = transport_for(&server, 3)
            .post_form("getMonitors", "")
            .await
            .expect("call should succeed after rate limit");

        assert_eq!(body.as_ref(), br#"{"stat":"ok"}"#);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_connection_failure_is_request_error() {
        let config = ClientConfig::new("key")
            .with_base_url("http://127.0.0.1:9/v2/")
            .with_retry(fast_retry(1));
        let transport = Transport::new(&config).expect("transport");

        let err = transport
            .post_form("getMonitors", "")
            .await
            .expect_err("nothing listens on the discard port");

        assert!(matches!(err, ApiError::Request(_)));
    }
}
