//! Response envelope decoding
//!
//! Every UptimeRobot response is a JSON object with a `stat` field. Anything
//! other than `"ok"` is an API-level failure described by the `error` field.
//! The rest of the object is left untyped; call sites pull out the keys they
//! need through the checked accessors on [`Envelope`].

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiError;

/// A successfully decoded response (`stat == "ok"`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

/// Decodes a raw response body and checks its `stat` field
///
/// # Returns
/// * `Ok(Envelope)` - The full object when `stat` is `"ok"`
/// * `Err(ApiError::Decode)` - If the body is not a JSON object
/// * `Err(ApiError::Api)` - If `stat` is anything else, carrying the `error` field as JSON text
pub fn decode(body: &[u8]) -> Result<Envelope, ApiError> {
    let object: Map<String, Value> =
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            source,
            body: String::from_utf8_lossy(body).into_owned(),
        })?;

    if object.get("stat").and_then(Value::as_str) != Some("ok") {
        let error = object.get("error").unwrap_or(&Value::Null);
        let message = serde_json::to_string(error).unwrap_or_default();
        return Err(ApiError::Api { message });
    }

    Ok(Envelope(object))
}

impl Envelope {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a field or `ApiError::MissingField`
    pub fn require(&self, key: &str) -> Result<&Value, ApiError> {
        self.0
            .get(key)
            .ok_or_else(|| ApiError::MissingField(key.to_string()))
    }

    pub fn str_field(&self, key: &str) -> Result<&str, ApiError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| unexpected(key, "a string"))
    }

    pub fn i64_field(&self, key: &str) -> Result<i64, ApiError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| unexpected(key, "an integer"))
    }

    pub fn array_field(&self, key: &str) -> Result<&Vec<Value>, ApiError> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| unexpected(key, "an array"))
    }

    pub fn object_field(&self, key: &str) -> Result<&Map<String, Value>, ApiError> {
        self.require(key)?
            .as_object()
            .ok_or_else(|| unexpected(key, "an object"))
    }
}

fn unexpected(field: &str, expected: &'static str) -> ApiError {
    ApiError::UnexpectedType {
        field: field.to_string(),
        expected,
    }
}
