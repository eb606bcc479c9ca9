//! Executing `HttpRequest`s.
//!
//! `Transport` is the seam between the client and whatever performs the
//! network round-trip. `UreqTransport` is the bundled blocking implementation;
//! tests and embedding hosts plug in their own.

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Non-2xx statuses are data, not errors: implementations return `Ok` for
/// every response that arrived and reserve `Err` for failures where no
/// response exists (DNS, connect, TLS, timeout).
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// Builds an agent per request so each call gets its own timeout and TLS
/// verification setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl UreqTransport {
    fn agent(request: &HttpRequest) -> ureq::Agent {
        let tls = ureq::tls::TlsConfig::builder()
            .disable_verification(!request.verify_tls)
            .build();
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(request.timeout))
            .tls_config(tls)
            .build()
            .new_agent()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Self::agent(request);

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError::request_failed(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // A body that is not UTF-8 must not hide the status.
        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError::request_failed(e.to_string()))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status: Some(status),
            headers,
            body,
        })
    }
}
