use crate::foundation::Digest;
use sha2::{Digest as _, Sha256};

/// SHA-256 over canonical payload bytes.
///
/// Total over any byte slice; identical payloads always yield identical digests.
#[derive(Clone, Copy, Debug, Default)]
pub struct DigestEngine;

impl DigestEngine {
    pub fn digest(payload: &[u8]) -> Digest {
        Digest::new(Sha256::digest(payload).into())
    }

    /// Digest of the concatenation of `parts`, without materializing it.
    pub fn digest_parts(parts: &[&[u8]]) -> Digest {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Digest::new(hasher.finalize().into())
    }
}
