//! Configure-execute-read REST client.
//!
//! # Design
//! `RestClient` keeps the request currently configured, the last response,
//! and the TLS settings. `set_request` and the body/header setters only touch
//! the configured `HttpRequest`; `execute` hands it to the owned `Transport`
//! and replaces the stored response wholesale. Transport failures never
//! escape as `Err`: they become status `-1` plus an `error()` string, so
//! callers check the status after every call.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{CertificateCredentials, ClientOptions, TlsPolicy};
use crate::error::{FieldError, TransportError};
use crate::http::{parse_header_line, Destination, HttpMethod, HttpRequest, HttpResponse};
use crate::signing::{self, HashAlgorithm};
use crate::transport::{initialize_transport, Transport, UreqTransport};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier handed out by `RestClient::set_request`.
pub type RequestId = u64;

/// Blocking client for one configured request at a time.
///
/// Not meant to be shared between threads; use one instance per thread.
pub struct RestClient {
    transport: Box<dyn Transport>,
    options: ClientOptions,
    request: HttpRequest,
    request_id: RequestId,
    response: HttpResponse,
    credentials: Option<CertificateCredentials>,
    use_tls: bool,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("options", &self.options)
            .field("request", &self.request)
            .field("request_id", &self.request_id)
            .field("status", &self.response.status)
            .field("use_tls", &self.use_tls)
            .finish_non_exhaustive()
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RestClient {
    pub fn new() -> Self {
        Self::with_options(ClientOptions::default())
    }

    pub fn with_options(options: ClientOptions) -> Self {
        Self::with_transport(options, Box::new(UreqTransport::new()))
    }

    pub fn with_transport(options: ClientOptions, transport: Box<dyn Transport>) -> Self {
        initialize_transport();
        Self {
            transport,
            options,
            request: HttpRequest::default(),
            request_id: 0,
            response: HttpResponse::default(),
            credentials: None,
            use_tls: false,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Replace the configured request.
    ///
    /// `timeout_seconds == 0` keeps the transport default. An empty
    /// `content_type` sends no `Content-Type` header. A non-empty
    /// `header_line` of the form `Name: value` becomes a custom header.
    /// An `https:` URL turns on certificate verification for this client.
    pub fn set_request(
        &mut self,
        url: &str,
        method: HttpMethod,
        timeout_seconds: u64,
        content_type: &str,
        header_line: &str,
    ) -> RequestId {
        let mut request = HttpRequest::new(method, url);
        if request.is_secure() {
            self.use_tls = true;
        }
        if !content_type.is_empty() {
            request.content_type = Some(content_type.to_string());
        }
        if timeout_seconds > 0 {
            request.timeout = Some(Duration::from_secs(timeout_seconds));
        }
        if !header_line.is_empty() {
            match parse_header_line(header_line) {
                Some(header) => request.headers.push(header),
                None => tracing::warn!(header_line, "ignoring malformed header line"),
            }
        }

        self.request = request;
        self.request_id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        self.request_id
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.request
            .headers
            .push((name.to_string(), value.to_string()));
    }

    /// Replace the request body.
    pub fn set_body(&mut self, body: &str) {
        self.request.body = Some(body.to_string());
    }

    /// Replace the request body with a single `name=value` pair.
    pub fn set_form_body(&mut self, name: &str, value: &str) {
        self.request.body = Some(format!("{name}={value}"));
    }

    /// Stream the next response body into `path` instead of memory.
    pub fn save_to_file(&mut self, path: impl Into<PathBuf>) {
        self.request.destination = Destination::File(path.into());
    }

    pub fn set_use_tls(&mut self, use_tls: bool) {
        self.use_tls = use_tls;
    }

    pub fn uses_tls(&self) -> bool {
        self.use_tls
    }

    pub fn show_detail_log(&mut self) {
        self.options.verbose = true;
    }

    /// Authenticate with a client certificate. An empty passphrase means the
    /// key is not encrypted.
    pub fn set_certification(
        &mut self,
        certificate_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
        passphrase: &str,
    ) {
        self.credentials = Some(CertificateCredentials {
            certificate_path: certificate_path.into(),
            key_path: key_path.into(),
            passphrase: (!passphrase.is_empty()).then(|| passphrase.to_string()),
        });
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        TlsPolicy::select(self.credentials.as_ref(), self.use_tls)
    }

    /// Perform the configured request and return its status, or `-1` when
    /// the transport call failed.
    pub fn execute(&mut self) -> i32 {
        let tls = self.tls_policy();
        self.log_request(&tls);

        self.response = match self.perform(&tls) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    request_id = self.request_id,
                    url = %self.request.url,
                    error = %err,
                    "transport call failed"
                );
                HttpResponse::transport_failure(err.to_string())
            }
        };
        self.log_response();
        self.response.status
    }

    fn perform(&mut self, tls: &TlsPolicy) -> Result<HttpResponse, TransportError> {
        match &self.request.destination {
            Destination::Memory => {
                let mut body = Vec::new();
                let status = self
                    .transport
                    .perform(&self.request, tls, &self.options, &mut body)?;
                let status = i32::from(status);
                if !self.options.body_retention.keeps(status) {
                    tracing::debug!(status, "discarding response body");
                    body.clear();
                }
                Ok(HttpResponse {
                    status,
                    body,
                    error: None,
                })
            }
            Destination::File(path) => {
                let mut file = io::BufWriter::new(File::create(path)?);
                let status = self
                    .transport
                    .perform(&self.request, tls, &self.options, &mut file)?;
                file.flush()?;
                Ok(HttpResponse {
                    status: i32::from(status),
                    body: Vec::new(),
                    error: None,
                })
            }
        }
    }

    fn log_request(&self, tls: &TlsPolicy) {
        let tls = match tls {
            TlsPolicy::ClientCertificate(_) => "client-certificate",
            TlsPolicy::Verify => "verify",
            TlsPolicy::Insecure => "insecure",
        };
        if self.options.verbose {
            tracing::info!(
                request_id = self.request_id,
                method = %self.request.method,
                url = %self.request.url,
                tls,
                headers = ?self.request.outgoing_headers(),
                body_len = self.request.payload().map_or(0, str::len),
                "sending request"
            );
        } else {
            tracing::debug!(
                request_id = self.request_id,
                method = %self.request.method,
                url = %self.request.url,
                tls,
                "sending request"
            );
        }
    }

    fn log_response(&self) {
        if self.options.verbose {
            tracing::info!(
                request_id = self.request_id,
                status = self.response.status,
                body_len = self.response.body.len(),
                "received response"
            );
        } else {
            tracing::debug!(
                request_id = self.request_id,
                status = self.response.status,
                "received response"
            );
        }
    }

    pub fn status(&self) -> i32 {
        self.response.status
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    /// Response body as text; empty when routed to a file or not executed.
    pub fn text(&self) -> String {
        self.response.text()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.response.body
    }

    /// Last transport error, empty if the call reached the server.
    pub fn error(&self) -> &str {
        self.response.error.as_deref().unwrap_or("")
    }

    /// Parse `override_text` (or the stored body when it is `None` or empty)
    /// and return the top-level `field`.
    pub fn field_value(&self, field: &str, override_text: Option<&str>) -> Result<Value, FieldError> {
        let stored;
        let text = match override_text.filter(|text| !text.is_empty()) {
            Some(text) => text,
            None => {
                stored = self.text();
                &stored
            }
        };
        extract_field(text, field)
    }

    /// Deserialize the top-level `field` into `T`.
    pub fn field<T: DeserializeOwned>(
        &self,
        field: &str,
        override_text: Option<&str>,
    ) -> Result<T, FieldError> {
        let value = self.field_value(field, override_text)?;
        serde_json::from_value(value).map_err(|_| FieldError::Type {
            field: field.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn field_string(&self, field: &str, override_text: Option<&str>) -> Result<String, FieldError> {
        match self.field_value(field, override_text)? {
            Value::String(s) => Ok(s),
            _ => Err(type_error(field, "string")),
        }
    }

    pub fn field_i64(&self, field: &str, override_text: Option<&str>) -> Result<i64, FieldError> {
        self.field_value(field, override_text)?
            .as_i64()
            .ok_or_else(|| type_error(field, "signed integer"))
    }

    pub fn field_u64(&self, field: &str, override_text: Option<&str>) -> Result<u64, FieldError> {
        self.field_value(field, override_text)?
            .as_u64()
            .ok_or_else(|| type_error(field, "unsigned integer"))
    }

    pub fn field_f64(&self, field: &str, override_text: Option<&str>) -> Result<f64, FieldError> {
        self.field_value(field, override_text)?
            .as_f64()
            .ok_or_else(|| type_error(field, "number"))
    }

    pub fn field_bool(&self, field: &str, override_text: Option<&str>) -> Result<bool, FieldError> {
        self.field_value(field, override_text)?
            .as_bool()
            .ok_or_else(|| type_error(field, "boolean"))
    }

    /// Percent-encode `s` for use inside a URL.
    pub fn encode(&self, s: &str) -> String {
        signing::encode(s)
    }

    /// HMAC of `data` under `key` as lowercase hex.
    pub fn sign(&self, key: &str, data: &str, algorithm: HashAlgorithm) -> String {
        signing::sign(key, data, algorithm)
    }
}

fn type_error(field: &str, expected: &'static str) -> FieldError {
    FieldError::Type {
        field: field.to_string(),
        expected,
    }
}

/// Parse `text` as a JSON object and take the top-level `field`.
pub fn extract_field(text: &str, field: &str) -> Result<Value, FieldError> {
    let value: Value = serde_json::from_str(text).map_err(|e| FieldError::Parse(e.to_string()))?;
    match value {
        Value::Object(mut map) => map
            .remove(field)
            .ok_or_else(|| FieldError::Missing(field.to_string())),
        _ => Err(FieldError::Parse("top-level value is not an object".to_string())),
    }
}
