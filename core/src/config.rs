//! Client options and TLS settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which responses keep their body in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRetention {
    /// Store the body for every status code.
    #[default]
    Always,
    /// Store the body only when the status is exactly 200. Other responses,
    /// including 4xx/5xx bodies with error details, are discarded.
    OnlyOk,
}

impl BodyRetention {
    pub fn keeps(self, status: i32) -> bool {
        match self {
            BodyRetention::Always => true,
            BodyRetention::OnlyOk => status == 200,
        }
    }
}

/// Per-client options.
///
/// Every field has a default so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Log request and response detail at `info` instead of `debug`.
    pub verbose: bool,
    pub body_retention: BodyRetention,
    /// Redirect hops followed before giving up.
    pub max_redirects: u32,
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            body_retention: BodyRetention::Always,
            max_redirects: 10,
            user_agent: None,
        }
    }
}

impl ClientOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Client certificate used for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateCredentials {
    /// PEM file holding the client certificate chain.
    pub certificate_path: PathBuf,
    /// PEM file holding the private key, optionally encrypted PKCS#8.
    pub key_path: PathBuf,
    pub passphrase: Option<String>,
}

/// How the transport treats server certificates for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Present a client certificate; server verification stays on.
    ClientCertificate(CertificateCredentials),
    /// Default verification of certificate and hostname.
    Verify,
    /// Certificate and hostname checks disabled. Used for plain `http` targets
    /// so self-signed test servers reached through redirects keep working.
    Insecure,
}

impl TlsPolicy {
    pub fn select(credentials: Option<&CertificateCredentials>, use_tls: bool) -> Self {
        match credentials {
            Some(creds) => TlsPolicy::ClientCertificate(creds.clone()),
            None if use_tls => TlsPolicy::Verify,
            None => TlsPolicy::Insecure,
        }
    }
}
