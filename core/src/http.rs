//! HTTP transport seam.
//!
//! # Design
//! Requests and responses are plain data. `PushwooshClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and parses the `HttpResponse` it
//! gets back, so the network is swappable: `UreqTransport` for real calls, a
//! closure or a recording struct in tests.
//!
//! Every Pushwoosh endpoint is a JSON `POST`, so there is no method field.

use std::time::Duration;

use crate::error::TransportError;

/// Default timeout for a single round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON `POST` described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one HTTP round trip. Implementations must not retry.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
///
/// HTTP error statuses are returned as data rather than `Err` so the reply
/// body still reaches envelope parsing.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.send(request.body.as_bytes())?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |request: HttpRequest| {
            Ok::<_, TransportError>(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: request.body,
            })
        };
        let response = transport
            .execute(HttpRequest {
                url: "http://localhost/createMessage".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
            })
            .unwrap();
        assert_eq!(response.body, "{}");
    }

    #[test]
    fn ureq_transport_reports_connection_failure() {
        // Port 1 on loopback is not listening in any sane test environment.
        let transport = UreqTransport::with_timeout(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                url: "http://127.0.0.1:1/createMessage".to_string(),
                headers: Vec::new(),
                body: "{}".to_string(),
            })
            .unwrap_err();
        assert!(!err.0.is_empty());
    }
}
