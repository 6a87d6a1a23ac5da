//! C-ABI wrapper around `rest-core`.
//!
//! # Overview
//! Exposes the configure → execute → read client through `extern "C"`
//! functions so C and C++ hosts can issue signed REST calls without linking
//! to Rust's HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Functions mirror the `RestClient` methods 1:1, prefixed with `rest_`.
//! - Null arguments never crash: setters ignore them, getters return null or
//!   the `-1` transport-failure status.
//! - The C caller owns all returned pointers and must call the matching
//!   `rest_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rest_core::{RestClient, TRANSPORT_FAILURE_STATUS};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client with default options.
///
/// Returns null if an internal panic occurs.
/// The caller must free the returned pointer with `rest_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_new() -> *mut FfiRestClient {
    catch_unwind(|| Box::into_raw(Box::new(FfiRestClient { inner: RestClient::new() })))
        .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `rest_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_free(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

/// Run `f` against a non-null client, returning `default` on null or panic.
fn with_client<T>(client: *mut FfiRestClient, default: T, f: impl FnOnce(&mut RestClient) -> T) -> T {
    if client.is_null() {
        return default;
    }
    let client = unsafe { &mut *client };
    match catch_unwind(AssertUnwindSafe(|| f(&mut client.inner))) {
        Ok(value) => value,
        Err(_) => default,
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configure the next request.
///
/// `timeout_seconds == 0` keeps the transport default. `content_type` and
/// `header_line` may be null or empty. Returns the request id, or 0 if
/// `client` or `url` is null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_set_request(
    client: *mut FfiRestClient,
    url: *const c_char,
    method: FfiHttpMethod,
    timeout_seconds: u64,
    content_type: *const c_char,
    header_line: *const c_char,
) -> u64 {
    with_client(client, 0, |c| {
        let Some(url) = (unsafe { str_arg(url) }) else {
            return 0;
        };
        let content_type = unsafe { str_arg(content_type) }.unwrap_or("");
        let header_line = unsafe { str_arg(header_line) }.unwrap_or("");
        c.set_request(url, method.into(), timeout_seconds, content_type, header_line)
    })
}

/// Append a custom header to the configured request.
#[unsafe(no_mangle)]
pub extern "C" fn rest_add_header(
    client: *mut FfiRestClient,
    name: *const c_char,
    value: *const c_char,
) {
    with_client(client, (), |c| {
        if let (Some(name), Some(value)) = unsafe { (str_arg(name), str_arg(value)) } {
            c.add_header(name, value);
        }
    })
}

/// Replace the request body.
#[unsafe(no_mangle)]
pub extern "C" fn rest_set_body(client: *mut FfiRestClient, body: *const c_char) {
    with_client(client, (), |c| {
        if let Some(body) = unsafe { str_arg(body) } {
            c.set_body(body);
        }
    })
}

/// Replace the request body with `name=value`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_set_form_body(
    client: *mut FfiRestClient,
    name: *const c_char,
    value: *const c_char,
) {
    with_client(client, (), |c| {
        if let (Some(name), Some(value)) = unsafe { (str_arg(name), str_arg(value)) } {
            c.set_form_body(name, value);
        }
    })
}

/// Stream the next response body to `path` instead of memory.
#[unsafe(no_mangle)]
pub extern "C" fn rest_save_to_file(client: *mut FfiRestClient, path: *const c_char) {
    with_client(client, (), |c| {
        if let Some(path) = unsafe { str_arg(path) } {
            c.save_to_file(path);
        }
    })
}

/// Use a client certificate. `passphrase` may be null for unencrypted keys.
#[unsafe(no_mangle)]
pub extern "C" fn rest_set_certification(
    client: *mut FfiRestClient,
    certificate_path: *const c_char,
    key_path: *const c_char,
    passphrase: *const c_char,
) {
    with_client(client, (), |c| {
        let (Some(cert), Some(key)) = (unsafe { (str_arg(certificate_path), str_arg(key_path)) })
        else {
            return;
        };
        let passphrase = unsafe { str_arg(passphrase) }.unwrap_or("");
        c.set_certification(cert, key, passphrase);
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn rest_set_use_tls(client: *mut FfiRestClient, use_tls: bool) {
    with_client(client, (), |c| c.set_use_tls(use_tls))
}

#[unsafe(no_mangle)]
pub extern "C" fn rest_show_detail_log(client: *mut FfiRestClient) {
    with_client(client, (), |c| c.show_detail_log())
}

// ---------------------------------------------------------------------------
// Execution and response access
// ---------------------------------------------------------------------------

/// Perform the configured request. Returns the HTTP status, or -1 on
/// transport failure, null client, or panic.
#[unsafe(no_mangle)]
pub extern "C" fn rest_execute(client: *mut FfiRestClient) -> i32 {
    with_client(client, TRANSPORT_FAILURE_STATUS, |c| c.execute())
}

/// Response body as a newly allocated C string. Null if `client` is null.
/// Free with `rest_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_get_text(client: *mut FfiRestClient) -> *mut c_char {
    with_client(client, std::ptr::null_mut(), |c| into_c_string(c.text()))
}

/// Last transport error as a newly allocated C string, empty if none.
/// Free with `rest_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_get_error(client: *mut FfiRestClient) -> *mut c_char {
    with_client(client, std::ptr::null_mut(), |c| {
        into_c_string(c.error().to_string())
    })
}

/// Extract a top-level JSON field from `override_text`, or from the stored
/// response body when `override_text` is null or empty.
///
/// Always returns a result; free it with `rest_free_field_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_get_field(
    client: *mut FfiRestClient,
    field: *const c_char,
    override_text: *const c_char,
) -> *mut FfiFieldResult {
    if client.is_null() {
        return FfiFieldResult::null_arg("client");
    }
    let Some(field) = (unsafe { str_arg(field) }) else {
        return FfiFieldResult::null_arg("field");
    };
    let client = unsafe { &*client };
    catch_unwind(AssertUnwindSafe(|| {
        let override_text = unsafe { str_arg(override_text) };
        match client.inner.field_value(field, override_text) {
            Ok(value) => FfiFieldResult::ok(value),
            Err(e) => FfiFieldResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiFieldResult::panic("panic in rest_get_field"))
}

// ---------------------------------------------------------------------------
// Helpers independent of a client
// ---------------------------------------------------------------------------

/// Percent-encode `s` for use in a URL. Null in, null out.
#[unsafe(no_mangle)]
pub extern "C" fn rest_encode(s: *const c_char) -> *mut c_char {
    catch_unwind(|| match unsafe { str_arg(s) } {
        Some(s) => into_c_string(rest_core::encode(s)),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// HMAC of `data` under `key` as lowercase hex. Null if either is null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_sign(
    key: *const c_char,
    data: *const c_char,
    algorithm: FfiHashAlgorithm,
) -> *mut c_char {
    catch_unwind(|| match unsafe { (str_arg(key), str_arg(data)) } {
        (Some(key), Some(data)) => into_c_string(rest_core::sign(key, data, algorithm.into())),
        _ => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiFieldResult` returned by `rest_get_field`. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_free_field_result(result: *mut FfiFieldResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.json.is_null() {
            drop(unsafe { CString::from_raw(result.json) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
