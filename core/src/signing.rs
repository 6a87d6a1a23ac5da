//! HMAC signing and URL escaping helpers.
//!
//! Both are independent of the request flow and stateless.

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

/// Everything except RFC 3986 unreserved characters gets escaped.
const ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Hash function behind the HMAC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Sha512,
    Sha256,
    /// Kept for upstream APIs that still require HMAC-SHA1.
    Sha1,
}

impl HashAlgorithm {
    /// Digest length in hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Sha512 => 128,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha1 => 40,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha512 => f.write_str("sha512"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
            HashAlgorithm::Sha1 => f.write_str("sha1"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha1" => Ok(HashAlgorithm::Sha1),
            other => Err(format!("unsupported hash algorithm: {other}")),
        }
    }
}

/// HMAC of `data` under `key`, as lowercase hex.
pub fn sign(key: &str, data: &str, algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Sha512 => mac_hex::<Hmac<Sha512>>(key, data),
        HashAlgorithm::Sha256 => mac_hex::<Hmac<Sha256>>(key, data),
        HashAlgorithm::Sha1 => mac_hex::<Hmac<Sha1>>(key, data),
    }
}

fn mac_hex<M: Mac + KeyInit>(key: &str, data: &str) -> String {
    let mut mac = <M as KeyInit>::new_from_slice(key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Percent-encode `s` for use inside a URL.
pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, ESCAPE_SET).to_string()
}
