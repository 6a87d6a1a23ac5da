//! The network seam.
//!
//! # Design
//! `RestClient` owns one boxed `Transport` and drives it once per
//! `execute`. The production implementation wraps a `ureq` agent built per
//! call from the TLS policy and options, so no connection state survives
//! between calls. Tests substitute a recording transport to check what would
//! have been sent.

use std::io::Write;
use std::sync::Once;
use std::time::Duration;

use pkcs8::der::Document;
use pkcs8::{EncryptedPrivateKeyInfo, LineEnding};
use ureq::tls::{parse_pem, ClientCert, PemItem, PrivateKey, TlsConfig};
use ureq::Agent;

use crate::config::{CertificateCredentials, ClientOptions, TlsPolicy};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest};

static TRANSPORT_INIT: Once = Once::new();

/// Process-wide transport setup. Idempotent; the first `RestClient`
/// calls it.
pub fn initialize_transport() {
    TRANSPORT_INIT.call_once(|| {
        tracing::debug!(backend = "ureq", "http transport initialized");
    });
}

/// Performs one blocking HTTP exchange.
pub trait Transport: Send {
    /// Send `request`, follow redirects, copy the final body into `sink` and
    /// return the final HTTP status.
    fn perform(
        &mut self,
        request: &HttpRequest,
        tls: &TlsPolicy,
        options: &ClientOptions,
        sink: &mut dyn Write,
    ) -> Result<u16, TransportError>;
}

/// `Transport` backed by `ureq`.
#[derive(Debug, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn perform(
        &mut self,
        request: &HttpRequest,
        tls: &TlsPolicy,
        options: &ClientOptions,
        sink: &mut dyn Write,
    ) -> Result<u16, TransportError> {
        let agent = build_agent(tls, options, request.timeout)?;

        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = agent.get(&request.url);
                for (name, value) in request.outgoing_headers() {
                    builder = builder.header(name, value);
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = agent.post(&request.url);
                for (name, value) in request.outgoing_headers() {
                    builder = builder.header(name, value);
                }
                match request.payload() {
                    Some(body) => builder.send(body.as_bytes())?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        std::io::copy(&mut response.body_mut().as_reader(), sink)?;
        sink.flush()?;
        Ok(status)
    }
}

fn build_agent(
    tls: &TlsPolicy,
    options: &ClientOptions,
    timeout: Option<Duration>,
) -> Result<Agent, TransportError> {
    let tls_config = match tls {
        TlsPolicy::Verify => TlsConfig::builder().build(),
        TlsPolicy::Insecure => TlsConfig::builder().disable_verification(true).build(),
        TlsPolicy::ClientCertificate(creds) => TlsConfig::builder()
            .client_cert(Some(load_client_cert(creds)?))
            .build(),
    };

    let mut config = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(options.max_redirects)
        .timeout_global(timeout)
        .tls_config(tls_config);
    if let Some(user_agent) = options.user_agent.as_deref() {
        config = config.user_agent(user_agent);
    }
    Ok(config.build().new_agent())
}

fn load_client_cert(creds: &CertificateCredentials) -> Result<ClientCert, TransportError> {
    let cert_pem = std::fs::read(&creds.certificate_path)?;
    let chain = parse_pem(&cert_pem)
        .filter_map(|item| match item {
            Ok(PemItem::Certificate(cert)) => Some(Ok(cert)),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if chain.is_empty() {
        return Err(TransportError::Certificate(format!(
            "no certificate found in {}",
            creds.certificate_path.display()
        )));
    }

    let key_pem = std::fs::read(&creds.key_path)?;
    let key = match creds.passphrase.as_deref().filter(|p| !p.is_empty()) {
        Some(passphrase) => decrypt_key(&key_pem, passphrase)?,
        None => PrivateKey::from_pem(&key_pem)?,
    };
    Ok(ClientCert::new_with_certs(&chain, key))
}

/// Decrypt a PEM `ENCRYPTED PRIVATE KEY` (PKCS#8) with `passphrase`.
fn decrypt_key(pem: &[u8], passphrase: &str) -> Result<PrivateKey<'static>, TransportError> {
    let pem = std::str::from_utf8(pem)
        .map_err(|e| TransportError::Certificate(format!("key file is not PEM: {e}")))?;
    let (label, document) =
        Document::from_pem(pem).map_err(|e| TransportError::Certificate(e.to_string()))?;
    if label != "ENCRYPTED PRIVATE KEY" {
        return Err(TransportError::Certificate(format!(
            "passphrase given but key is `{label}`, expected an encrypted PKCS#8 key"
        )));
    }
    let info = EncryptedPrivateKeyInfo::try_from(document.as_bytes())
        .map_err(|e| TransportError::Certificate(e.to_string()))?;
    let secret = info
        .decrypt(passphrase)
        .map_err(|e| TransportError::Certificate(format!("cannot decrypt key: {e}")))?;
    let pem = secret
        .to_pem("PRIVATE KEY", LineEnding::LF)
        .map_err(|e| TransportError::Certificate(e.to_string()))?;
    Ok(PrivateKey::from_pem(pem.as_bytes())?)
}
