//! Error types for UptimeRobot API calls
//!
//! Only transport, status, decode and API-reported failures reach callers.
//! Cache failures are handled inside [`crate::cache`] and never surface here.

use thiserror::Error;

/// Errors that can occur when calling the UptimeRobot API
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (DNS, connection, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The middleware stack failed outside of reqwest itself
    #[error("HTTP middleware failed: {0}")]
    Middleware(anyhow::Error),

    /// The endpoint could not be joined onto the base URL
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    /// Final response after retries was not `200 OK`
    #[error("Got {status} response from UptimeRobot: {body}")]
    Status {
        /// HTTP status of the last attempt
        status: reqwest::StatusCode,
        /// Raw response body
        body: String,
    },

    /// The response body was not a JSON object
    #[error("Failed to decode JSON from UptimeRobot: {source}. Response body: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Raw response body, lossily converted for diagnostics
        body: String,
    },

    /// The API answered with `stat` other than `"ok"`
    #[error("Got error from UptimeRobot: {message}")]
    Api {
        /// The envelope's `error` field re-serialized as JSON text
        message: String,
    },

    /// A field expected in a successful envelope is absent
    #[error("Missing expected field in response: {0}")]
    MissingField(String),

    /// A field is present but holds the wrong JSON type
    #[error("Field '{field}' in response is not {expected}")]
    UnexpectedType {
        field: String,
        expected: &'static str,
    },

    /// The client was configured with unusable values
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest_middleware::Error> for ApiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => Self::Request(e),
            reqwest_middleware::Error::Middleware(e) => Self::Middleware(e),
        }
    }
}
