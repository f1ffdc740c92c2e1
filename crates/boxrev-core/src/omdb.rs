//! OMDb metadata source.
//!
//! The external API answers `GET <address>/?apikey=<key>&t=<title>` with a
//! JSON payload carrying a boolean-like `Response` field and, on failure, an
//! `Error` string. The `Response` flag is parsed strictly: the literal
//! string `"True"` is truthy and anything else is falsy — the payload is
//! never evaluated.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::domain::Title;

/// Transport-level failure: no usable response came back at all. Counts
/// against the fetch pass failure budget.
#[derive(Debug, Error)]
#[error("transport failure: {0}")]
pub struct TransportError(pub String);

/// A source of raw movie metadata payloads, one lookup per title.
pub trait MetadataSource {
    fn lookup(&self, title: &Title) -> Result<Value, TransportError>;
}

/// Error text OMDb returns for an unknown title. A lookup that fails this
/// way is a skip, not a budget-counted failure.
pub const NOT_FOUND_ERROR: &str = "Movie not found!";

/// Strictly parse the boolean-like `Response` field.
pub fn response_flag(payload: &Value) -> bool {
    payload.get("Response").and_then(Value::as_str) == Some("True")
}

/// The `Error` field of a negative payload, if present.
pub fn error_text(payload: &Value) -> Option<&str> {
    payload.get("Error").and_then(Value::as_str)
}

/// Blocking OMDb HTTP client.
pub struct OmdbClient {
    address: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OmdbClient {
    /// Build the client up front; a failed HTTP stack initialization is a
    /// transport error, not a panic.
    pub fn new(
        address: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|error| TransportError(error.to_string()))?;
        Ok(Self {
            address: address.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

impl MetadataSource for OmdbClient {
    fn lookup(&self, title: &Title) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(&self.address)
            .query(&[("apikey", self.api_key.as_str()), ("t", title.as_str())])
            .send()
            .map_err(|error| TransportError(error.to_string()))?;
        response
            .json::<Value>()
            .map_err(|error| TransportError(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn response_flag_only_accepts_the_literal_true_string() {
        assert!(response_flag(&json!({"Response": "True"})));
        assert!(!response_flag(&json!({"Response": "False"})));
        assert!(!response_flag(&json!({"Response": "true"})));
        assert!(!response_flag(&json!({"Response": true})));
        assert!(!response_flag(&json!({})));
    }

    #[test]
    fn error_text_reads_the_error_field() {
        let payload = json!({"Response": "False", "Error": NOT_FOUND_ERROR});
        assert_eq!(error_text(&payload), Some(NOT_FOUND_ERROR));
        assert_eq!(error_text(&json!({})), None);
    }

    #[test]
    fn client_construction_is_fallible_not_panicking() {
        let client = OmdbClient::new("http://localhost:1", "k");
        assert!(client.is_ok());
    }
}
