//! Error types for the Pushwoosh client.
//!
//! # Design
//! A reply that arrives but fails the status contract is a `RequestError` and
//! carries the whole envelope so callers can inspect what the API said.
//! Failures to get a reply at all are `TransportError`s; the two are kept
//! apart because only the latter is usually worth retrying.

use thiserror::Error;

use crate::types::ResponseEnvelope;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The API answered with something other than `200` / `"OK"`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}, {}", .envelope.status_code, .envelope.status_message)]
pub struct RequestError {
    pub envelope: ResponseEnvelope,
}

impl RequestError {
    pub fn new(envelope: ResponseEnvelope) -> Self {
        Self { envelope }
    }

    pub fn status_code(&self) -> i64 {
        self.envelope.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.envelope.status_message
    }
}

/// The HTTP round trip itself failed (connect, TLS, timeout, body read).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        Self(err.to_string())
    }
}

/// Errors returned by `PushwooshClient`.
#[derive(Error, Debug)]
pub enum Error {
    /// Reply failed the success contract.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The reply body, or a field inside it, did not have the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A successful reply lacked the field the operation returns.
    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The failing envelope, when the API itself rejected the call.
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            Error::Request(err) => Some(&err.envelope),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(code: i64, message: &str) -> ResponseEnvelope {
        ResponseEnvelope {
            status_code: code,
            status_message: message.to_string(),
            response: None,
        }
    }

    #[test]
    fn request_error_displays_code_and_message() {
        let err = RequestError::new(envelope(404, "error"));
        assert_eq!(err.to_string(), "404, error");
    }

    #[test]
    fn wrapped_request_error_keeps_envelope() {
        let err: Error = RequestError::new(envelope(210, "Argument error")).into();
        assert_eq!(err.to_string(), "request error: 210, Argument error");
        assert_eq!(err.envelope().map(|e| e.status_code), Some(210));
    }

    #[test]
    fn transport_error_has_no_envelope() {
        let err: Error = TransportError::new("connection refused").into();
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert!(err.envelope().is_none());
    }
}
