mod engine;

pub use engine::SignatureEngine;

use crate::foundation::{SigningError, SCALAR_SIZE};
use p256::ecdsa::Signature as EcdsaSignature;
use p256::elliptic_curve::scalar::IsHigh;
use p256::FieldBytes;
use std::fmt;

/// Big-endian encoding of a P-256 scalar.
pub type Scalar = [u8; SCALAR_SIZE];

/// ECDSA P-256 signature as its `(r, s)` scalar pair.
///
/// Construction validates both scalars against the curve order. Low-S form is not implied by the
/// type: `normalized()` produces it, and everything the pipeline emits has been normalized.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    inner: EcdsaSignature,
}

impl Signature {
    pub fn from_scalars(r: Scalar, s: Scalar) -> Result<Self, SigningError> {
        EcdsaSignature::from_scalars(FieldBytes::from(r), FieldBytes::from(s))
            .map(Self::from_ecdsa)
            .map_err(|_| SigningError::encoding("signature scalars must be non-zero and below the curve order"))
    }

    /// Parse the fixed-width `r || s` form.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != 2 * SCALAR_SIZE {
            return Err(SigningError::encoding(format!("expected {} signature bytes, got {}", 2 * SCALAR_SIZE, bytes.len())));
        }
        EcdsaSignature::from_slice(bytes)
            .map(Self::from_ecdsa)
            .map_err(|_| SigningError::encoding("signature scalars must be non-zero and below the curve order"))
    }

    pub(crate) fn from_ecdsa(inner: EcdsaSignature) -> Self {
        Self { inner }
    }

    pub(crate) fn as_ecdsa(&self) -> &EcdsaSignature {
        &self.inner
    }

    pub fn r(&self) -> Scalar {
        scalar_bytes(&self.inner.split_bytes().0)
    }

    pub fn s(&self) -> Scalar {
        scalar_bytes(&self.inner.split_bytes().1)
    }

    pub fn is_low_s(&self) -> bool {
        !bool::from(self.inner.s().is_high())
    }

    /// Canonical low-S representative: `s` becomes `n - s` when `s > n/2`.
    pub fn normalized(&self) -> Self {
        Self { inner: self.inner.normalize_s().unwrap_or(self.inner) }
    }

    pub fn to_bytes(&self) -> [u8; 2 * SCALAR_SIZE] {
        let mut out = [0u8; 2 * SCALAR_SIZE];
        out.copy_from_slice(self.inner.to_bytes().as_slice());
        out
    }
}

fn scalar_bytes(bytes: &FieldBytes) -> Scalar {
    let mut out = [0u8; SCALAR_SIZE];
    out.copy_from_slice(bytes.as_slice());
    out
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature").field("r", &hex::encode(self.r())).field("s", &hex::encode(self.s())).finish()
    }
}
