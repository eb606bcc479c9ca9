//! Request descriptors and the debugging snapshots kept by the client.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpMethod;

/// Endpoint that submits an address and answers with a `cid`.
pub const VERIFY_ENDPOINT: &str = "verifyaddr";
/// Endpoint that returns the verification outcome for a `cid`.
pub const RESULT_ENDPOINT: &str = "getresult";

/// One call against a named Proofy endpoint.
///
/// `params` become the query string in insertion order. `aid` and `key` are
/// appended by the client unless present here. `post_data` is JSON-encoded
/// into the body of POST requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
    pub post_data: Option<Value>,
}

impl ApiRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Set a query parameter, replacing any earlier value under `name`.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    pub fn post_data(mut self, data: Value) -> Self {
        self.post_data = Some(data);
        self
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|(k, _)| k == name)
    }
}

/// Render a JSON value as a query-string value. Strings are taken verbatim;
/// everything else uses its JSON text (`42`, `true`).
pub fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Request arguments after defaults and caller overrides have been merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    /// Seconds.
    pub timeout: f64,
    pub sslverify: bool,
    pub method: HttpMethod,
}

/// Snapshot of the most recent outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub timeout: Duration,
}

/// Raw headers and body of the most recent response. Both are empty after a
/// transport failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LastResponse {
    pub headers: Vec<(String, String)>,
    pub body: String,
}
