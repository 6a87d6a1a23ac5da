//! Error types for the REST client.
//!
//! # Design
//! Transport errors never reach the caller of `RestClient::execute`; they are
//! folded into the `-1` status and the `error()` string. They still exist as a
//! typed enum so the `Transport` seam can use `?` internally. Field errors
//! are returned per call from the JSON accessors and leave stored response
//! state untouched.

use thiserror::Error;

/// Failure of a single transport call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP library reported a failure (DNS, connect, TLS, timeout...).
    #[error("{0}")]
    Http(#[from] ureq::Error),

    /// Reading the response or writing the destination failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Certificate or key material could not be loaded.
    #[error("client certificate error: {0}")]
    Certificate(String),
}

/// Failure to extract a field from a JSON response body.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The text is not valid JSON or not a JSON object.
    #[error("invalid JSON: {0}")]
    Parse(String),

    /// The top-level key is absent.
    #[error("field `{0}` not found")]
    Missing(String),

    /// The value exists but cannot be coerced to the requested type.
    #[error("field `{field}` is not a {expected}")]
    Type { field: String, expected: &'static str },
}
