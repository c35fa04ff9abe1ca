use crate::cli::InputArgs;
use endorse_core::domain::{DigestEngine, SignatureEngine};
use endorse_core::foundation::util::encoding::decode_hex;
use endorse_core::foundation::{Digest, EndorseError};
use endorse_core::infrastructure::config::AppConfig;
use endorse_core::infrastructure::keys::load_key_material;
use log::debug;
use std::path::Path;

/// The digest named by `input`: hashed from text, hex or a file, or taken as given.
pub fn resolve_digest(input: &InputArgs) -> Result<Digest, EndorseError> {
    if let Some(digest) = &input.digest {
        return digest.trim().parse();
    }
    let bytes = if let Some(text) = &input.text {
        text.as_bytes().to_vec()
    } else if let Some(hex) = &input.hex {
        decode_hex(hex)?
    } else if let Some(path) = &input.file {
        std::fs::read(path).map_err(|err| EndorseError::Message(format!("cannot read {}: {err}", path.display())))?
    } else {
        return Err(EndorseError::invalid_request("no input given"));
    };
    debug!("digesting input bytes={}", bytes.len());
    Ok(DigestEngine::digest(&bytes))
}

pub fn sign(key_path: &Path, digest: &Digest, raw: bool) -> Result<String, EndorseError> {
    let key = load_key_material(key_path)?;
    let engine = SignatureEngine::new();
    let signature = if raw { engine.sign(digest, &key)? } else { engine.sign_canonical(digest, &key)? };
    Ok(hex::encode(engine.encode(&signature)?))
}

pub fn normalize(signature_hex: &str) -> Result<String, EndorseError> {
    let engine = SignatureEngine::new();
    let signature = engine.decode(&decode_hex(signature_hex)?)?;
    if !signature.is_low_s() {
        debug!("signature had high S; normalized");
    }
    Ok(hex::encode(engine.encode(&engine.normalize(&signature))?))
}

pub fn verify(public_key_hex: &str, digest_hex: &str, signature_hex: &str) -> Result<bool, EndorseError> {
    let engine = SignatureEngine::new();
    let digest: Digest = digest_hex.trim().parse()?;
    let signature = engine.decode(&decode_hex(signature_hex)?)?;
    Ok(engine.verify(&digest, &signature, &decode_hex(public_key_hex)?)?)
}

pub fn public_key(key_path: &Path) -> Result<String, EndorseError> {
    let key = load_key_material(key_path)?;
    Ok(hex::encode(SignatureEngine::new().public_key(&key)?))
}

pub fn render_config(config: &AppConfig, json: bool) -> Result<String, EndorseError> {
    if json {
        Ok(serde_json::to_string_pretty(config)?)
    } else {
        Ok(toml::to_string_pretty(config)?)
    }
}
