//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! plain enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use proofy_core::{HttpMethod, HttpRequest, HttpResponse, ProofyClient, TransportError};

/// Opaque handle to a `ProofyClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiProofyClient {
    pub(crate) inner: ProofyClient,
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A prepared request, ready for the host to execute.
///
/// Built by `proofy_prepare_request`; release with `proofy_free_request`.
/// `body` is null for GET requests.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
    pub verify_tls: bool,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    ///
    /// Returns null if any string contains an interior NUL byte.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let Some(url) = to_c_string(req.url) else {
            return std::ptr::null_mut();
        };
        let body = match req.body {
            Some(b) => match to_c_string(b) {
                Some(ptr) => ptr,
                None => {
                    drop(unsafe { CString::from_raw(url) });
                    return std::ptr::null_mut();
                }
            },
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k).unwrap_or(std::ptr::null_mut()),
                    value: to_c_string(v).unwrap_or(std::ptr::null_mut()),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            timeout_ms: req.timeout.as_millis() as u64,
            verify_tls: req.verify_tls,
        }))
    }
}

/// The outcome of a host-executed request.
///
/// The C caller fills this in after executing an `FfiHttpRequest` and passes
/// a pointer to `proofy_complete_request`. The FFI layer reads but does not
/// free these fields.
///
/// A non-null `error_code` marks a transport failure; `status`, `headers` and
/// `body` are then ignored. `status == 0` means the transport reported no
/// status.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const c_char,
    pub error_code: *const c_char,
    pub error_message: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> Result<HttpResponse, TransportError> {
        if let Some(code) = unsafe { borrow_str(self.error_code) } {
            let message = unsafe { borrow_str(self.error_message) }.unwrap_or("");
            return Err(TransportError::new(code, message));
        }

        let mut headers = Vec::new();
        if !self.headers.is_null() && self.headers_len > 0 {
            let raw = unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            for h in raw {
                if let (Some(k), Some(v)) = unsafe { (borrow_str(h.key), borrow_str(h.value)) } {
                    headers.push((k.to_string(), v.to_string()));
                }
            }
        }

        Ok(HttpResponse {
            status: (self.status != 0).then_some(self.status),
            headers,
            body: unsafe { borrow_str(self.body) }.unwrap_or("").to_string(),
        })
    }
}

/// Move a Rust string to the C heap. `None` if it holds a NUL byte.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> Option<*mut c_char> {
    CString::new(s).ok().map(CString::into_raw)
}

/// Borrow a C string as `&str`. `None` for null pointers and invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}
