//! Blocking client for the Proofy email verification API.
//!
//! # Overview
//! `ProofyClient::verify` submits an address to `verifyaddr`, then fetches
//! the outcome from `getresult` using the returned `cid`. The generic
//! `get` / `post` calls reach any other endpoint. After every call the client
//! exposes `success()`, `last_error()`, `last_request()` and
//! `last_response()` for debugging.
//!
//! # Design
//! - The network round-trip sits behind the `Transport` trait. `UreqTransport`
//!   is the default; hosts that own their HTTP stack can instead drive
//!   `prepare_request` / `complete_request` themselves (host-does-IO).
//! - Request arguments are JSON objects: defaults are built per call and the
//!   caller's overrides are deep-merged on top with `merge_args`.
//! - API-level failures are recorded on the client, not returned as `Err`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod merge;
pub mod transport;
pub mod types;

pub use client::{DefaultArgsFilter, ProofyClient, UNKNOWN_ERROR, UNKNOWN_STATUS};
pub use config::ClientConfig;
pub use error::{ProofyError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use merge::merge_args;
pub use transport::{Transport, UreqTransport};
pub use types::{ApiRequest, LastRequest, LastResponse, RESULT_ENDPOINT, VERIFY_ENDPOINT};
