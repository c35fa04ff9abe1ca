use super::Signature;
use crate::foundation::{Digest, KeyFormat, KeyMaterial, SigningError};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use p256::SecretKey;

const SEC1_PEM_LABEL: &str = "BEGIN EC PRIVATE KEY";

/// Stateless ECDSA P-256 service. Key material is passed per call and dropped when the call returns.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureEngine;

impl SignatureEngine {
    pub fn new() -> Self {
        Self
    }

    /// RFC 6979 deterministic signature over a precomputed digest. `s` may be high; see `normalize`.
    pub fn sign(&self, digest: &Digest, key: &KeyMaterial) -> Result<Signature, SigningError> {
        let signing_key = parse_signing_key(key)?;
        let signature: EcdsaSignature =
            signing_key.sign_prehash(digest.as_slice()).map_err(|err| SigningError::encoding(format!("ecdsa signing failed: {err}")))?;
        Ok(Signature::from_ecdsa(signature))
    }

    pub fn sign_canonical(&self, digest: &Digest, key: &KeyMaterial) -> Result<Signature, SigningError> {
        Ok(self.normalize(&self.sign(digest, key)?))
    }

    pub fn normalize(&self, signature: &Signature) -> Signature {
        signature.normalized()
    }

    /// DER (`SEQUENCE { INTEGER r, INTEGER s }`) encoding.
    pub fn encode(&self, signature: &Signature) -> Result<Vec<u8>, SigningError> {
        Ok(signature.as_ecdsa().to_der().as_bytes().to_vec())
    }

    pub fn decode(&self, der: &[u8]) -> Result<Signature, SigningError> {
        let ecdsa = EcdsaSignature::from_der(der).map_err(|err| SigningError::encoding(format!("malformed DER signature: {err}")))?;
        Ok(Signature::from_ecdsa(ecdsa))
    }

    /// Check `signature` against a SEC1-encoded public key.
    pub fn verify(&self, digest: &Digest, signature: &Signature, public_key: &[u8]) -> Result<bool, SigningError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(public_key).map_err(|_| SigningError::invalid_key("public key is not a SEC1-encoded P-256 point"))?;
        Ok(verifying_key.verify_prehash(digest.as_slice(), signature.as_ecdsa()).is_ok())
    }

    /// Uncompressed SEC1 public key for `key`.
    pub fn public_key(&self, key: &KeyMaterial) -> Result<Vec<u8>, SigningError> {
        let signing_key = parse_signing_key(key)?;
        Ok(signing_key.verifying_key().to_encoded_point(false).as_bytes().to_vec())
    }
}

// Parse errors from the curve crates are summarized, never echoed, so no key bytes reach logs.
fn parse_signing_key(key: &KeyMaterial) -> Result<SigningKey, SigningError> {
    let secret = match key.format() {
        KeyFormat::Pem => {
            let pem = std::str::from_utf8(key.expose_secret()).map_err(|_| SigningError::invalid_key("PEM key material is not UTF-8"))?;
            if pem.contains(SEC1_PEM_LABEL) {
                SecretKey::from_sec1_pem(pem).map_err(|_| SigningError::invalid_key("SEC1 PEM is not a P-256 private key"))?
            } else {
                SecretKey::from_pkcs8_pem(pem).map_err(|_| SigningError::invalid_key("PKCS#8 PEM is not a P-256 private key"))?
            }
        }
        KeyFormat::RawScalar => SecretKey::from_slice(key.expose_secret())
            .map_err(|_| SigningError::invalid_key("raw key is not a valid 32-byte P-256 scalar"))?,
    };
    Ok(SigningKey::from(&secret))
}
