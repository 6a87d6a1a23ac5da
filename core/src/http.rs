//! HTTP request and response types.
//!
//! # Design
//! Requests and responses are plain data. `RestClient` fills an `HttpRequest`
//! during configuration and hands it to a `Transport`, which performs the
//! network call. Keeping the request inspectable makes the rules about
//! bodies, headers and TLS policy testable without touching the network.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross the FFI
//! boundary without lifetime concerns.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Status reported when the request never reached the remote server.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// URL prefix that marks a request as needing certificate verification.
pub const SECURE_SCHEME_PREFIX: &str = "https:";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// Where the response body goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Destination {
    /// Accumulate into `HttpResponse::body`.
    #[default]
    Memory,
    /// Stream into a file, created or truncated before the call.
    File(PathBuf),
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
    pub destination: Destination,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// The bytes that will actually be sent. GET never carries a payload and
    /// an empty POST body sends nothing.
    pub fn payload(&self) -> Option<&str> {
        match (self.method, self.body.as_deref()) {
            (HttpMethod::Post, Some(body)) if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// All headers in send order: `Content-Type` first, then custom headers.
    pub fn outgoing_headers(&self) -> Vec<(&str, &str)> {
        let content_type = self
            .content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .map(|ct| ("Content-Type", ct));
        content_type
            .into_iter()
            .chain(self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }

    pub fn is_secure(&self) -> bool {
        self.url.starts_with(SECURE_SCHEME_PREFIX)
    }
}

/// Parse a single `Name: value` header line. Returns `None` when the line has
/// no colon or an empty name.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// An HTTP response described as plain data.
///
/// `status` is the HTTP code, or `TRANSPORT_FAILURE_STATUS` with `error` set
/// when the transport call itself failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: i32,
    pub body: Vec<u8>,
    pub error: Option<String>,
}

impl HttpResponse {
    pub fn transport_failure(error: String) -> Self {
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            body: Vec::new(),
            error: Some(error),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
