//! Blocking REST client core.
//!
//! # Overview
//! Configure one GET or POST request, execute it synchronously, then read the
//! status, the raw body, a transport error, or a single top-level field of a
//! JSON body. HMAC signing and URL escaping helpers sit alongside.
//!
//! # Design
//! - `RestClient` follows configure → execute → read. Reconfiguring overwrites
//!   the previous request; executing replaces the previous response.
//! - Transport failures are data, not errors: status `-1` plus `error()`.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   production implementation and owns no state between calls.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod signing;
pub mod transport;

pub use client::{extract_field, RequestId, RestClient};
pub use config::{BodyRetention, CertificateCredentials, ClientOptions, TlsPolicy};
pub use error::{FieldError, TransportError};
pub use http::{
    Destination, HttpMethod, HttpRequest, HttpResponse, SECURE_SCHEME_PREFIX,
    TRANSPORT_FAILURE_STATUS,
};
pub use signing::{encode, sign, HashAlgorithm};
pub use transport::{initialize_transport, Transport, UreqTransport};
