//! Error types for the Proofy client.
//!
//! # Design
//! API outcomes (non-2xx statuses, `detail` messages, undecodable bodies) are
//! not Rust errors: the client records them as strings next to its success
//! flag. `ProofyError` only covers the cases where a call cannot go ahead at
//! all.

use thiserror::Error;

/// A failure reported by the HTTP transport before any status was received.
///
/// Displays as `"<code>: <message>"`, which is also what the client stores
/// as its last error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct TransportError {
    pub code: String,
    pub message: String,
}

impl TransportError {
    /// Code used by the bundled transport for every network-level failure.
    pub const REQUEST_FAILED: &'static str = "http_request_failed";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(Self::REQUEST_FAILED, message)
    }
}

/// Errors returned by `ProofyClient` operations.
#[derive(Debug, Error)]
pub enum ProofyError {
    /// A response lacked a key the next step depends on (e.g. `cid`).
    #[error("response has no `{0}` key")]
    MissingKey(&'static str),

    /// The merged request arguments could not be decoded.
    #[error("invalid request arguments: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    /// The `timeout` argument was negative, NaN or out of range.
    #[error("invalid timeout: {0} seconds")]
    InvalidTimeout(f64),

    #[error("invalid endpoint url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, ProofyError>;
