//! Stateful client for the Proofy email verification API.
//!
//! # Design
//! Every call goes through the same three steps:
//!
//! 1. `prepare_request` merges the default request arguments with the caller's
//!    overrides, appends the credentials and records `last_request`.
//! 2. The resulting `HttpRequest` is executed, either by the client's own
//!    `Transport` (`get`, `post`, `verify`) or by the embedding host.
//! 3. `complete_request` decodes the body, resolves the status, and records
//!    `last_response`, `last_error` and the success flag.
//!
//! API failures are reported through `success()` / `last_error()` rather than
//! `Err`, so a caller can always inspect `last_response()` afterwards.

use std::fmt;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ProofyError, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::merge::merge_args;
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    param_value, ApiRequest, LastRequest, LastResponse, RequestOptions, RESULT_ENDPOINT,
    VERIFY_ENDPOINT,
};

/// Status reported when neither the transport nor the payload carries one.
pub const UNKNOWN_STATUS: u16 = 418;

pub const UNKNOWN_ERROR: &str = "Unknown error, call last_response() to find out what happened.";

/// Hook that may rewrite the default request arguments before the caller's
/// overrides are merged in. Receives the defaults and the final query
/// parameters.
pub type DefaultArgsFilter = Box<dyn Fn(Value, &[(String, String)]) -> Value + Send + Sync>;

pub struct ProofyClient<T = UreqTransport> {
    aid: String,
    api_key: String,
    config: ClientConfig,
    transport: T,
    default_args_filter: Option<DefaultArgsFilter>,
    request_successful: bool,
    last_error: Option<String>,
    last_response: LastResponse,
    last_request: Option<LastRequest>,
}

impl ProofyClient<UreqTransport> {
    /// Client against the production API with default settings.
    pub fn new(aid: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_config(aid, api_key, ClientConfig::default(), UreqTransport)
    }
}

impl<T> ProofyClient<T> {
    pub fn with_config(
        aid: impl Into<String>,
        api_key: impl Into<String>,
        config: ClientConfig,
        transport: T,
    ) -> Self {
        Self {
            aid: aid.into(),
            api_key: api_key.into(),
            config,
            transport,
            default_args_filter: None,
            request_successful: false,
            last_error: None,
            last_response: LastResponse::default(),
            last_request: None,
        }
    }

    /// Full URL of a named endpoint, without query string.
    pub fn api_endpoint(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Whether the most recent request resolved to a 2xx status.
    pub fn success(&self) -> bool {
        self.request_successful
    }

    /// Error recorded by the most recent request, from either the transport
    /// or the API.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_response(&self) -> &LastResponse {
        &self.last_response
    }

    pub fn last_request(&self) -> Option<&LastRequest> {
        self.last_request.as_ref()
    }

    pub fn verify_ssl(&self) -> bool {
        self.config.verify_ssl
    }

    pub fn set_verify_ssl(&mut self, verify: bool) {
        self.config.verify_ssl = verify;
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_default_args_filter<F>(&mut self, filter: F)
    where
        F: Fn(Value, &[(String, String)]) -> Value + Send + Sync + 'static,
    {
        self.default_args_filter = Some(Box::new(filter));
    }

    /// Resolve `request` into an `HttpRequest` and record it as the last
    /// request. Clears the previous outcome.
    ///
    /// `overrides` is deep-merged onto the defaults (`headers`, `body`,
    /// `timeout`, `sslverify`, `method`); pass `Value::Null` for none.
    /// `timeout` falls back to the configured default.
    ///
    /// On `Err` the call counts as a failed request: `success()` is false,
    /// `last_error()` holds the error text and there is no last request.
    pub fn prepare_request(
        &mut self,
        method: HttpMethod,
        request: ApiRequest,
        overrides: &Value,
        timeout: Option<Duration>,
    ) -> Result<HttpRequest> {
        self.request_successful = false;
        self.last_error = None;

        match self.resolve_request(method, request, overrides, timeout) {
            Ok(req) => {
                debug!(method = %req.method, url = %redacted_url(&req.url), "prepared Proofy request");
                self.last_request = Some(LastRequest {
                    url: req.url.clone(),
                    headers: req.headers.clone(),
                    body: req.body.clone().unwrap_or_default(),
                    timeout: req.timeout,
                });
                Ok(req)
            }
            Err(err) => {
                warn!(error = %err, "Proofy request not sent");
                self.last_error = Some(err.to_string());
                self.last_request = None;
                self.last_response = LastResponse::default();
                Err(err)
            }
        }
    }

    fn resolve_request(
        &self,
        method: HttpMethod,
        request: ApiRequest,
        overrides: &Value,
        timeout: Option<Duration>,
    ) -> Result<HttpRequest> {
        let ApiRequest {
            endpoint,
            mut params,
            post_data,
        } = request;

        if !params.iter().any(|(k, _)| k == "aid") {
            params.push(("aid".to_string(), self.aid.clone()));
        }
        if !params.iter().any(|(k, _)| k == "key") {
            params.push(("key".to_string(), self.api_key.clone()));
        }

        let timeout = timeout.unwrap_or(self.config.timeout);
        let mut defaults = json!({
            "headers": {
                "Accept": "application/json",
                "Content-Type": "application/json",
                "User-Agent": self.config.user_agent,
            },
            "body": "",
            "timeout": timeout.as_secs_f64(),
            "sslverify": self.config.verify_ssl,
            "method": method,
        });
        if let Some(filter) = &self.default_args_filter {
            defaults = filter(defaults, &params);
        }

        let options: RequestOptions = serde_json::from_value(merge_args(overrides, &defaults))
            .map_err(ProofyError::InvalidOptions)?;
        let timeout = Duration::try_from_secs_f64(options.timeout)
            .map_err(|_| ProofyError::InvalidTimeout(options.timeout))?;

        let url = build_url(&self.api_endpoint(&endpoint), &params)?;
        let headers: Vec<(String, String)> = options.headers.into_iter().collect();
        let body = match options.method {
            HttpMethod::Post => Some(match &post_data {
                Some(data) => data.to_string(),
                None => options.body,
            }),
            HttpMethod::Get => None,
        };

        Ok(HttpRequest {
            method: options.method,
            url,
            headers,
            body,
            timeout,
            verify_tls: options.sslverify,
        })
    }

    /// Record the outcome of a request built by `prepare_request` and return
    /// the decoded body, or `None` when there is nothing decodable.
    pub fn complete_request(
        &mut self,
        outcome: std::result::Result<HttpResponse, TransportError>,
    ) -> Option<Value> {
        match outcome {
            Err(err) => {
                warn!(error = %err, "Proofy transport failure");
                self.last_error = Some(err.to_string());
                self.last_response = LastResponse::default();
                self.request_successful = false;
                None
            }
            Ok(response) => {
                let decoded = decode_body(&response.body);
                let status = find_http_status(response.status, decoded.as_ref());
                debug!(status, "Proofy response received");
                self.last_response = LastResponse {
                    headers: response.headers,
                    body: response.body,
                };
                self.determine_success(status, decoded.as_ref());
                decoded
            }
        }
    }

    fn determine_success(&mut self, status: u16, decoded: Option<&Value>) {
        if (200..=299).contains(&status) {
            self.request_successful = true;
            return;
        }
        self.request_successful = false;

        let message = match decoded
            .and_then(|v| v.get("detail"))
            .filter(|detail| !detail.is_null())
        {
            Some(detail) => {
                let code = decoded
                    .and_then(|v| v.get("status"))
                    .and_then(status_number)
                    .unwrap_or(0);
                format!("{code}: {}", param_value(detail))
            }
            None => UNKNOWN_ERROR.to_string(),
        };
        warn!(status, error = %message, "Proofy request failed");
        self.last_error = Some(message);
    }
}

impl<T: Transport> ProofyClient<T> {
    pub fn get(
        &mut self,
        request: ApiRequest,
        overrides: &Value,
        timeout: Option<Duration>,
    ) -> Result<Option<Value>> {
        self.execute(HttpMethod::Get, request, overrides, timeout)
    }

    pub fn post(
        &mut self,
        request: ApiRequest,
        overrides: &Value,
        timeout: Option<Duration>,
    ) -> Result<Option<Value>> {
        self.execute(HttpMethod::Post, request, overrides, timeout)
    }

    /// Verify `email` in two steps: submit it to `verifyaddr`, then fetch the
    /// outcome from `getresult` using the returned `cid`.
    ///
    /// The first call's status is not checked. If its payload carries no
    /// `cid` this fails with `ProofyError::MissingKey` and the second call is
    /// never made; `last_error()` then still describes the first call.
    pub fn verify(&mut self, email: &str) -> Result<Option<Value>> {
        let submitted = self.get(
            ApiRequest::new(VERIFY_ENDPOINT).param("email", email),
            &Value::Null,
            None,
        )?;

        let cid = submitted
            .as_ref()
            .and_then(|v| v.get("cid"))
            .filter(|cid| !cid.is_null())
            .map(param_value)
            .ok_or(ProofyError::MissingKey("cid"))?;

        self.get(
            ApiRequest::new(RESULT_ENDPOINT).param("cid", cid),
            &Value::Null,
            None,
        )
    }

    fn execute(
        &mut self,
        method: HttpMethod,
        request: ApiRequest,
        overrides: &Value,
        timeout: Option<Duration>,
    ) -> Result<Option<Value>> {
        let http_request = self.prepare_request(method, request, overrides, timeout)?;
        let outcome = self.transport.execute(&http_request);
        Ok(self.complete_request(outcome))
    }
}

impl<T> fmt::Debug for ProofyClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProofyClient")
            .field("aid", &self.aid)
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .field("request_successful", &self.request_successful)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

/// Append `params` to `endpoint_url`, replacing any same-named parameters
/// already in its query string.
fn build_url(endpoint_url: &str, params: &[(String, String)]) -> Result<String> {
    let mut url = Url::parse(endpoint_url).map_err(|source| ProofyError::InvalidUrl {
        url: endpoint_url.to_string(),
        source,
    })?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .into_owned()
        .filter(|(k, _)| !params.iter().any(|(p, _)| p == k))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .extend_pairs(params);

    Ok(url.into())
}

/// `url` with the `key` query parameter masked, for logging.
fn redacted_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return String::new();
    };
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .into_owned()
        .map(|(k, v)| if k == "key" { (k, "REDACTED".to_string()) } else { (k, v) })
        .collect();
    if !pairs.is_empty() {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }
    parsed.into()
}

fn decode_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(body)
        .ok()
        .filter(|v| !v.is_null())
}

/// Transport status first, then the payload's `status` field, then 418.
fn find_http_status(transport_status: Option<u16>, decoded: Option<&Value>) -> u16 {
    if let Some(status) = transport_status.filter(|s| *s != 0) {
        return status;
    }
    decoded
        .and_then(|v| v.get("status"))
        .and_then(status_number)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(UNKNOWN_STATUS)
}

/// Integer reading of a payload `status`: numbers, or strings holding one.
fn status_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    type Outcome = std::result::Result<HttpResponse, TransportError>;

    /// Replays canned outcomes and remembers every request it was given.
    #[derive(Default)]
    struct ScriptedTransport {
        outcomes: RefCell<VecDeque<Outcome>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn with(outcomes: Vec<Outcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                requests: RefCell::default(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Outcome {
            self.requests.borrow_mut().push(request.clone());
            self.outcomes
                .borrow_mut()
                .pop_front()
                .expect("no scripted outcome left")
        }
    }

    fn client(outcomes: Vec<Outcome>) -> ProofyClient<ScriptedTransport> {
        ProofyClient::with_config(
            "12345",
            "secret",
            ClientConfig::default(),
            ScriptedTransport::with(outcomes),
        )
    }

    fn query(url: &str) -> Vec<(String, String)> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn transport_error_is_recorded_verbatim() {
        let mut c = client(vec![Err(TransportError::request_failed(
            "connection refused",
        ))]);
        let result = c
            .get(ApiRequest::new("verifyaddr"), &Value::Null, None)
            .unwrap();
        assert!(result.is_none());
        assert!(!c.success());
        assert_eq!(c.last_error(), Some("http_request_failed: connection refused"));
        assert_eq!(c.last_response(), &LastResponse::default());
    }

    #[test]
    fn created_with_json_body_is_success() {
        let mut c = client(vec![Ok(HttpResponse::new(201, r#"{"result":true,"cid":7}"#))]);
        let result = c
            .get(ApiRequest::new("verifyaddr"), &Value::Null, None)
            .unwrap();
        assert!(c.success());
        assert_eq!(c.last_error(), None);
        assert_eq!(result, Some(json!({"result": true, "cid": 7})));
    }

    #[test]
    fn not_found_detail_becomes_last_error() {
        let mut c = client(vec![Ok(HttpResponse::new(
            404,
            r#"{"status":404,"detail":"not found"}"#,
        ))]);
        let result = c
            .get(ApiRequest::new("getresult"), &Value::Null, None)
            .unwrap();
        assert!(!c.success());
        assert_eq!(c.last_error(), Some("404: not found"));
        assert_eq!(result.unwrap()["detail"], "not found");
    }

    #[test]
    fn failure_without_detail_reports_unknown_error() {
        let mut c = client(vec![Ok(HttpResponse::new(500, "<html>oops</html>"))]);
        let result = c
            .get(ApiRequest::new("getresult"), &Value::Null, None)
            .unwrap();
        assert!(result.is_none());
        assert_eq!(c.last_error(), Some(UNKNOWN_ERROR));
        assert_eq!(c.last_response().body, "<html>oops</html>");
    }

    #[test]
    fn payload_status_used_when_transport_has_none() {
        let mut c = client(vec![Ok(HttpResponse {
            status: None,
            headers: Vec::new(),
            body: r#"{"status":"403","detail":"forbidden"}"#.to_string(),
        })]);
        c.get(ApiRequest::new("getresult"), &Value::Null, None)
            .unwrap();
        assert!(!c.success());
        assert_eq!(c.last_error(), Some("403: forbidden"));
    }

    #[test]
    fn missing_status_everywhere_is_teapot() {
        assert_eq!(find_http_status(None, None), UNKNOWN_STATUS);
        assert_eq!(find_http_status(Some(0), Some(&json!({}))), UNKNOWN_STATUS);
        assert_eq!(find_http_status(None, Some(&json!({"status": 200}))), 200);
        assert_eq!(find_http_status(Some(204), Some(&json!({"status": 500}))), 204);
    }

    #[test]
    fn success_reflects_only_latest_call() {
        let mut c = client(vec![
            Ok(HttpResponse::new(200, r#"{"ok":1}"#)),
            Ok(HttpResponse::new(401, r#"{"status":401,"detail":"bad key"}"#)),
            Ok(HttpResponse::new(200, r#"{"ok":2}"#)),
        ]);
        c.get(ApiRequest::new("a"), &Value::Null, None).unwrap();
        assert!(c.success());
        c.get(ApiRequest::new("b"), &Value::Null, None).unwrap();
        assert!(!c.success());
        assert_eq!(c.last_error(), Some("401: bad key"));
        c.get(ApiRequest::new("c"), &Value::Null, None).unwrap();
        assert!(c.success());
        assert_eq!(c.last_error(), None);
    }

    #[test]
    fn verify_issues_two_gets_chained_by_cid() {
        let mut c = client(vec![
            Ok(HttpResponse::new(200, r#"{"result":true,"cid":98765}"#)),
            Ok(HttpResponse::new(
                200,
                r#"{"cid":98765,"checked":true,"result":[{"email":"a@b.com","status":1}]}"#,
            )),
        ]);
        let result = c.verify("a@b.com").unwrap().unwrap();
        assert_eq!(result["result"][0]["email"], "a@b.com");

        let requests = c.transport().requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method == HttpMethod::Get));

        assert!(requests[0].url.starts_with("https://api.proofy.io/verifyaddr?"));
        assert_eq!(
            query(&requests[0].url),
            vec![
                ("email".to_string(), "a@b.com".to_string()),
                ("aid".to_string(), "12345".to_string()),
                ("key".to_string(), "secret".to_string()),
            ]
        );

        assert!(requests[1].url.starts_with("https://api.proofy.io/getresult?"));
        assert_eq!(query(&requests[1].url)[0], ("cid".to_string(), "98765".to_string()));
        assert_eq!(c.last_request().unwrap().url, requests[1].url);
    }

    #[test]
    fn verify_without_cid_fails_after_one_call() {
        let mut c = client(vec![Ok(HttpResponse::new(
            401,
            r#"{"status":401,"detail":"Invalid API key"}"#,
        ))]);
        let err = c.verify("a@b.com").unwrap_err();
        assert!(matches!(err, ProofyError::MissingKey("cid")));
        assert_eq!(c.transport().requests.borrow().len(), 1);
        assert_eq!(c.last_error(), Some("401: Invalid API key"));
    }

    #[test]
    fn caller_credentials_are_not_overwritten() {
        let mut c = client(vec![Ok(HttpResponse::new(200, "{}"))]);
        c.get(
            ApiRequest::new("verifyaddr").param("key", "other"),
            &Value::Null,
            None,
        )
        .unwrap();
        let url = &c.transport().requests.borrow()[0].url;
        let keys: Vec<_> = query(url).into_iter().filter(|(k, _)| k == "key").collect();
        assert_eq!(keys, vec![("key".to_string(), "other".to_string())]);
    }

    #[test]
    fn default_request_arguments() {
        let mut c = client(vec![]);
        let req = c
            .prepare_request(HttpMethod::Get, ApiRequest::new("verifyaddr"), &Value::Null, None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.timeout, crate::config::DEFAULT_TIMEOUT);
        assert!(req.verify_tls);
        assert!(req.body.is_none());
        assert!(req
            .headers
            .contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(req
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));

        let last = c.last_request().unwrap();
        assert_eq!(last.url, req.url);
        assert_eq!(last.body, "");
    }

    #[test]
    fn overrides_merge_into_defaults() {
        let mut c = client(vec![]);
        let overrides = json!({
            "headers": {"Accept": "text/plain", "X-Trace": "1"},
            "sslverify": false,
            "timeout": 3
        });
        let req = c
            .prepare_request(HttpMethod::Get, ApiRequest::new("getresult"), &overrides, None)
            .unwrap();
        assert!(req.headers.contains(&("Accept".to_string(), "text/plain".to_string())));
        assert!(req.headers.contains(&("X-Trace".to_string(), "1".to_string())));
        assert!(req
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(!req.verify_tls);
        assert_eq!(req.timeout, Duration::from_secs(3));
    }

    #[test]
    fn explicit_timeout_and_ssl_flag_flow_into_request() {
        let mut c = client(vec![]);
        c.set_verify_ssl(false);
        let req = c
            .prepare_request(
                HttpMethod::Get,
                ApiRequest::new("getresult"),
                &Value::Null,
                Some(Duration::from_millis(1500)),
            )
            .unwrap();
        assert!(!req.verify_tls);
        assert_eq!(req.timeout, Duration::from_millis(1500));
        assert_eq!(c.last_request().unwrap().timeout, Duration::from_millis(1500));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let mut c = client(vec![]);
        let err = c
            .prepare_request(
                HttpMethod::Get,
                ApiRequest::new("getresult"),
                &json!({"method": "DELETE"}),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ProofyError::InvalidOptions(_)));

        let err = c
            .prepare_request(
                HttpMethod::Get,
                ApiRequest::new("getresult"),
                &json!({"timeout": -5}),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ProofyError::InvalidTimeout(_)));
    }

    #[test]
    fn rejected_request_replaces_previous_outcome() {
        let mut c = client(vec![Ok(HttpResponse::new(200, r#"{"cid":1}"#))]);
        c.get(ApiRequest::new("verifyaddr"), &Value::Null, None)
            .unwrap();
        assert!(c.success());
        assert!(c.last_request().is_some());

        let err = c
            .get(ApiRequest::new("getresult"), &json!({"timeout": -1}), None)
            .unwrap_err();
        assert!(matches!(err, ProofyError::InvalidTimeout(_)));
        assert!(!c.success());
        assert_eq!(c.last_error(), Some(err.to_string().as_str()));
        assert!(c.last_request().is_none());
        assert_eq!(c.last_response(), &LastResponse::default());
        assert_eq!(c.transport().requests.borrow().len(), 1);
    }

    #[test]
    fn null_detail_reports_unknown_error() {
        let mut c = client(vec![Ok(HttpResponse::new(
            500,
            r#"{"status":500,"detail":null}"#,
        ))]);
        c.get(ApiRequest::new("getresult"), &Value::Null, None)
            .unwrap();
        assert!(!c.success());
        assert_eq!(c.last_error(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn logged_url_masks_api_key() {
        let url = redacted_url("https://api.proofy.io/getresult?cid=7&aid=1&key=secret");
        assert_eq!(url, "https://api.proofy.io/getresult?cid=7&aid=1&key=REDACTED");
        assert!(!url.contains("secret"));
    }

    #[test]
    fn post_sends_json_encoded_post_data() {
        let mut c = client(vec![Ok(HttpResponse::new(200, r#"{"ok":true}"#))]);
        c.post(
            ApiRequest::new("bulk").post_data(json!({"emails": ["a@b.com"]})),
            &Value::Null,
            None,
        )
        .unwrap();
        let requests = c.transport().requests.borrow();
        assert_eq!(requests[0].method, HttpMethod::Post);
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"emails": ["a@b.com"]}));
        assert_eq!(c.last_request().unwrap().body, requests[0].body.clone().unwrap());
    }

    #[test]
    fn method_override_switches_verb() {
        let mut c = client(vec![]);
        let req = c
            .prepare_request(
                HttpMethod::Get,
                ApiRequest::new("verifyaddr"),
                &json!({"method": "POST", "body": "raw"}),
                None,
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some("raw"));
    }

    #[test]
    fn default_args_filter_runs_before_overrides() {
        let mut c = client(vec![]);
        c.set_default_args_filter(|mut defaults, params| {
            defaults["headers"]["X-Endpoint-Params"] = json!(params.len().to_string());
            defaults["headers"]["Accept"] = json!("application/vnd.proofy+json");
            defaults
        });
        let req = c
            .prepare_request(
                HttpMethod::Get,
                ApiRequest::new("verifyaddr").param("email", "a@b.com"),
                &json!({"headers": {"Accept": "application/json"}}),
                None,
            )
            .unwrap();
        assert!(req
            .headers
            .contains(&("X-Endpoint-Params".to_string(), "3".to_string())));
        assert!(req
            .headers
            .contains(&("Accept".to_string(), "application/json".to_string())));
    }

    #[test]
    fn api_endpoint_joins_with_single_slash() {
        let c = ProofyClient::with_config(
            "1",
            "k",
            ClientConfig::with_base_url("http://localhost:3000"),
            UreqTransport,
        );
        assert_eq!(c.api_endpoint("verifyaddr"), "http://localhost:3000/verifyaddr");
        let c = ProofyClient::new("1", "k");
        assert_eq!(c.api_endpoint("getresult"), "https://api.proofy.io/getresult");
    }

    #[test]
    fn email_is_percent_encoded_in_query() {
        let url = build_url(
            "https://api.proofy.io/verifyaddr",
            &[("email".to_string(), "a+b@c.com".to_string())],
        )
        .unwrap();
        assert_eq!(url, "https://api.proofy.io/verifyaddr?email=a%2Bb%40c.com");
    }

    #[test]
    fn existing_query_params_are_replaced() {
        let url = build_url(
            "http://localhost/verifyaddr?key=old&lang=en",
            &[("key".to_string(), "new".to_string())],
        )
        .unwrap();
        assert_eq!(url, "http://localhost/verifyaddr?lang=en&key=new");
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let c = ProofyClient::new("12345", "super-secret");
        let out = format!("{c:?}");
        assert!(out.contains("12345"));
        assert!(!out.contains("super-secret"));
    }
}
