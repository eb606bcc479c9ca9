//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe one Proofy round-trip as plain data. `ProofyClient`
//! builds an `HttpRequest`, something else executes it (a `Transport`
//! implementation, or the embedding host through the FFI layer), and the
//! outcome comes back as an `HttpResponse` or a `TransportError`.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved HTTP request.
///
/// `url` already carries the query string, including the `aid` and `key`
/// credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
    pub verify_tls: bool,
}

/// An HTTP response described as plain data.
///
/// `status` is `None` when the transport could not report one; the client
/// then falls back to the `status` field of the JSON payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
