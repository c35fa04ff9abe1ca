//! Secret byte wrappers for private key material.

use secrecy::{ExposeSecret, SecretVec};
use std::fmt;

/// Wrapper around secret bytes that prevents accidental logging.
pub struct SecretBytes {
    inner: SecretVec<u8>,
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret().to_vec())
    }
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: SecretVec::new(bytes) }
    }

    pub fn from_slice(slice: &[u8]) -> Self {
        Self::new(slice.to_vec())
    }

    /// Expose secret bytes for use (explicit, auditable in code review).
    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED {} bytes])", self.len())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFormat {
    /// PEM text, either PKCS#8 (`PRIVATE KEY`) or SEC1 (`EC PRIVATE KEY`).
    Pem,
    /// Big-endian 32-byte private scalar.
    RawScalar,
}

/// Private key material handed to the signature engine for a single signing call.
#[derive(Clone, Debug)]
pub struct KeyMaterial {
    format: KeyFormat,
    bytes: SecretBytes,
}

impl KeyMaterial {
    pub fn pem(pem: impl Into<Vec<u8>>) -> Self {
        Self { format: KeyFormat::Pem, bytes: SecretBytes::new(pem.into()) }
    }

    pub fn raw_scalar(scalar: &[u8]) -> Self {
        Self { format: KeyFormat::RawScalar, bytes: SecretBytes::from_slice(scalar) }
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.bytes.expose_secret()
    }
}
