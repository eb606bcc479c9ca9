//! C-ABI wrapper around `proofy-core`.
//!
//! # Overview
//! Lets a CMS plugin (through PHP FFI, or any language with a C FFI) drive
//! the Proofy client. Two styles are offered:
//!
//! - **Self-contained**: `proofy_verify`, `proofy_get`, `proofy_post` perform
//!   the HTTP round-trip with the bundled ureq transport.
//! - **Host-does-IO**: `proofy_prepare_request` hands back a plain request the
//!   host executes with its own HTTP API; `proofy_complete_request` feeds the
//!   outcome back in.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Results and parameters travel as JSON C strings.
//! - The C caller owns all returned pointers and must call the matching
//!   `proofy_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use proofy_core::{ApiRequest, ClientConfig, HttpMethod, ProofyClient, UreqTransport};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use types::*;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a stderr `tracing` subscriber honouring `RUST_LOG`.
///
/// Only the first call has an effect.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_init_logging() {
    let _ = catch_unwind(|| {
        let _ = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for the production Proofy API.
///
/// Returns null if `aid` or `api_key` is null or not UTF-8.
/// The caller must free the returned pointer with `proofy_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_client_new(
    aid: *const c_char,
    api_key: *const c_char,
) -> *mut FfiProofyClient {
    catch_unwind(|| {
        let (Some(aid), Some(key)) = (unsafe { borrow_str(aid) }, unsafe { borrow_str(api_key) })
        else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiProofyClient {
            inner: ProofyClient::new(aid, key),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client against `base_url` (e.g. a staging or mock API) with
/// otherwise default settings.
///
/// Returns null if any argument is null or not UTF-8.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_client_new_with_url(
    aid: *const c_char,
    api_key: *const c_char,
    base_url: *const c_char,
) -> *mut FfiProofyClient {
    catch_unwind(|| {
        let (Some(aid), Some(key), Some(url)) = (
            unsafe { borrow_str(aid) },
            unsafe { borrow_str(api_key) },
            unsafe { borrow_str(base_url) },
        ) else {
            return std::ptr::null_mut();
        };
        Box::into_raw(Box::new(FfiProofyClient {
            inner: ProofyClient::with_config(aid, key, ClientConfig::with_base_url(url), UreqTransport),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a JSON `ClientConfig` (`base_url`, `verify_ssl`,
/// `timeout` in seconds, `user_agent`; all optional).
///
/// Returns null on null arguments or malformed config.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_client_new_with_config(
    aid: *const c_char,
    api_key: *const c_char,
    config_json: *const c_char,
) -> *mut FfiProofyClient {
    catch_unwind(|| {
        let (Some(aid), Some(key)) = (unsafe { borrow_str(aid) }, unsafe { borrow_str(api_key) })
        else {
            return std::ptr::null_mut();
        };
        let config = match unsafe { borrow_str(config_json) } {
            Some(raw) => match serde_json::from_str::<ClientConfig>(raw) {
                Ok(cfg) => cfg,
                Err(_) => return std::ptr::null_mut(),
            },
            None => ClientConfig::default(),
        };
        Box::into_raw(Box::new(FfiProofyClient {
            inner: ProofyClient::with_config(aid, key, config, UreqTransport),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `proofy_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_client_free(client: *mut FfiProofyClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Toggle TLS certificate verification. No-op on a null client.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_set_verify_ssl(client: *mut FfiProofyClient, verify: bool) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if let Some(client) = unsafe { client.as_mut() } {
            client.inner.set_verify_ssl(verify);
        }
    }));
}

// ---------------------------------------------------------------------------
// Self-contained requests
// ---------------------------------------------------------------------------

/// Verify `email` (submit, then fetch the result).
///
/// Returns the JSON of the final result, or null when there is none; check
/// `proofy_last_error` in that case.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_verify(client: *mut FfiProofyClient, email: *const c_char) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(client), Some(email)) = (unsafe { client.as_mut() }, unsafe { borrow_str(email) })
        else {
            return std::ptr::null_mut();
        };
        match client.inner.verify(email) {
            Ok(result) => json_to_c(result),
            Err(e) => {
                tracing::warn!(error = %e, "verify aborted");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// GET `endpoint` with the query parameters in `params_json` (a JSON
/// object, may be null). Returns the decoded response as JSON, or null.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_get(
    client: *mut FfiProofyClient,
    endpoint: *const c_char,
    params_json: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return std::ptr::null_mut();
        };
        let Some(request) = build_api_request(endpoint, params_json, std::ptr::null()) else {
            return std::ptr::null_mut();
        };
        match client.inner.get(request, &Value::Null, None) {
            Ok(result) => json_to_c(result),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// POST to `endpoint`; `post_data_json` (may be null) becomes the JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_post(
    client: *mut FfiProofyClient,
    endpoint: *const c_char,
    params_json: *const c_char,
    post_data_json: *const c_char,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return std::ptr::null_mut();
        };
        let Some(request) = build_api_request(endpoint, params_json, post_data_json) else {
            return std::ptr::null_mut();
        };
        match client.inner.post(request, &Value::Null, None) {
            Ok(result) => json_to_c(result),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Host-does-IO
// ---------------------------------------------------------------------------

/// Build a request for the host to execute.
///
/// `overrides_json` (may be null) is deep-merged onto the default request
/// arguments. Returns null on null/invalid arguments.
/// The caller must free the returned pointer with `proofy_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_prepare_request(
    client: *mut FfiProofyClient,
    method: FfiHttpMethod,
    endpoint: *const c_char,
    params_json: *const c_char,
    overrides_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        let Some(client) = (unsafe { client.as_mut() }) else {
            return std::ptr::null_mut();
        };
        let Some(request) = build_api_request(endpoint, params_json, std::ptr::null()) else {
            return std::ptr::null_mut();
        };
        let Some(overrides) = parse_json(overrides_json) else {
            return std::ptr::null_mut();
        };
        match client
            .inner
            .prepare_request(HttpMethod::from(method), request, &overrides, None)
        {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Record the outcome of a host-executed request.
///
/// Returns the decoded body as JSON, or null when there is none. Success and
/// error details are available through `proofy_success` / `proofy_last_error`.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_complete_request(
    client: *mut FfiProofyClient,
    response: *const FfiHttpResponse,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(client), Some(response)) = (unsafe { client.as_mut() }, unsafe { response.as_ref() })
        else {
            return std::ptr::null_mut();
        };
        json_to_c(client.inner.complete_request(response.to_core()))
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

/// Whether the most recent request succeeded. False for a null client.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_success(client: *const FfiProofyClient) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { client.as_ref() }.is_some_and(|c| c.inner.success())
    }))
    .unwrap_or(false)
}

/// Last recorded error, or null if the most recent request had none.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_last_error(client: *const FfiProofyClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { client.as_ref() }
            .and_then(|c| c.inner.last_error())
            .and_then(to_c_string)
            .unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Raw body of the most recent response. Empty string before any request.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_last_response_body(client: *const FfiProofyClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { client.as_ref() }
            .and_then(|c| to_c_string(c.inner.last_response().body.as_str()))
            .unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// URL of the most recent request, or null before any request.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_last_request_url(client: *const FfiProofyClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        unsafe { client.as_ref() }
            .and_then(|c| c.inner.last_request())
            .and_then(|r| to_c_string(r.url.as_str()))
            .unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an optional JSON C string. Null pointer means `Value::Null`;
/// malformed JSON or invalid UTF-8 yields `None`.
fn parse_json(ptr: *const c_char) -> Option<Value> {
    if ptr.is_null() {
        return Some(Value::Null);
    }
    let raw = unsafe { borrow_str(ptr) }?;
    serde_json::from_str(raw).ok()
}

fn build_api_request(
    endpoint: *const c_char,
    params_json: *const c_char,
    post_data_json: *const c_char,
) -> Option<ApiRequest> {
    let endpoint = unsafe { borrow_str(endpoint) }?;
    let mut request = ApiRequest::new(endpoint);
    match parse_json(params_json)? {
        Value::Null => {}
        Value::Object(params) => {
            for (name, value) in &params {
                request = request.param(name.as_str(), proofy_core::types::param_value(value));
            }
        }
        _ => return None,
    }
    match parse_json(post_data_json)? {
        Value::Null => {}
        data => request = request.post_data(data),
    }
    Some(request)
}

fn json_to_c(value: Option<Value>) -> *mut c_char {
    value
        .and_then(|v| to_c_string(v.to_string()))
        .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `proofy_prepare_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers: Box<[FfiHeader]> = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn proofy_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { CString::from_raw(s) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
