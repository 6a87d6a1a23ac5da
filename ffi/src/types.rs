//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String` and enums with explicit discriminants.
//! Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use rest_core::{FieldError, HashAlgorithm, HttpMethod, RestClient};

/// Opaque handle to a `RestClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRestClient {
    pub(crate) inner: RestClient,
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<FfiHttpMethod> for HttpMethod {
    fn from(m: FfiHttpMethod) -> Self {
        match m {
            FfiHttpMethod::Get => HttpMethod::Get,
            FfiHttpMethod::Post => HttpMethod::Post,
        }
    }
}

/// HMAC hash function as a C enum. `Sha512` is the default.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum FfiHashAlgorithm {
    Sha512 = 0,
    Sha256 = 1,
    Sha1 = 2,
}

impl From<FfiHashAlgorithm> for HashAlgorithm {
    fn from(a: FfiHashAlgorithm) -> Self {
        match a {
            FfiHashAlgorithm::Sha512 => HashAlgorithm::Sha512,
            FfiHashAlgorithm::Sha256 => HashAlgorithm::Sha256,
            FfiHashAlgorithm::Sha1 => HashAlgorithm::Sha1,
        }
    }
}

/// Error codes returned in `FfiFieldResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Parse = 1,
    Missing = 2,
    Type = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for `rest_get_field`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `json` is
/// the field value serialized as JSON text (a string field comes back
/// quoted). On failure `json` is null and `error_message` describes the
/// problem.
#[repr(C)]
pub struct FfiFieldResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub json: *mut c_char,
}

impl FfiFieldResult {
    pub(crate) fn ok(value: serde_json::Value) -> *mut Self {
        Box::into_raw(Box::new(FfiFieldResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            json: into_c_string(value.to_string()),
        }))
    }

    pub(crate) fn from_error(err: FieldError) -> *mut Self {
        let error_code = match &err {
            FieldError::Parse(_) => FfiErrorCode::Parse,
            FieldError::Missing(_) => FfiErrorCode::Missing,
            FieldError::Type { .. } => FfiErrorCode::Type,
        };
        Self::failure(error_code, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiFieldResult {
            error_code,
            error_message: into_c_string(msg),
            json: std::ptr::null_mut(),
        }))
    }
}

/// Hand a Rust string to C. Text after an interior NUL is dropped, since C
/// could not see it anyway.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let c = CString::new(s).unwrap_or_else(|err| {
        let nul = err.nul_position();
        let mut bytes = err.into_vec();
        bytes.truncate(nul);
        CString::new(bytes).unwrap_or_default()
    });
    c.into_raw()
}

/// Borrow a C string argument. Null maps to `None`, invalid UTF-8 to `""`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or(""))
}
