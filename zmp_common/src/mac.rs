//! HMAC-SHA256 message authentication for gateway payloads.
//!
//! The gateway signs a canonical string of the form `k1=v1&k2=v2&...` where the key order is fixed per payload type.
//! Callers build that string explicitly with [`CanonicalString`] so that the field order is visible at the call site.
use std::fmt::Display;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Error)]
pub enum MacError {
    #[error("The signing key was rejected: {0}")]
    InvalidKey(String),
}

/// An ordered list of `key=value` pairs joined with `&`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalString(String);

impl CanonicalString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `key=value`. Values are used verbatim; no escaping is applied.
    pub fn field<V: Display>(mut self, key: &str, value: V) -> Self {
        if !self.0.is_empty() {
            self.0.push('&');
        }
        self.0.push_str(key);
        self.0.push('=');
        self.0.push_str(&value.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CanonicalString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn keyed_mac(secret: &str) -> Result<HmacSha256, MacError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| MacError::InvalidKey(e.to_string()))
}

/// Lower-case hex HMAC-SHA256 of the canonical string.
pub fn sign(canonical: &CanonicalString, secret: &str) -> Result<String, MacError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(canonical.as_str().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex MAC against the canonical string in constant time. Anything that is not valid hex fails.
pub fn verify(canonical: &CanonicalString, secret: &str, mac: &str) -> bool {
    let Ok(expected) = hex::decode(mac.trim()) else {
        return false;
    };
    let Ok(mut hmac) = keyed_mac(secret) else {
        return false;
    };
    hmac.update(canonical.as_str().as_bytes());
    hmac.verify_slice(&expected).is_ok()
}

/// Compares a shared secret presented by a caller with the configured one without leaking the position of the first
/// mismatch. Both values are reduced to a MAC first so that their lengths do not show either. An empty `expected`
/// matches nothing.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    const LABEL: &[u8] = b"zmp-shared-secret";
    if expected.is_empty() {
        return false;
    }
    let (Ok(mut a), Ok(mut b)) = (keyed_mac(expected), keyed_mac(provided)) else {
        return false;
    };
    a.update(LABEL);
    b.update(LABEL);
    b.verify_slice(&a.finalize().into_bytes()).is_ok()
}
