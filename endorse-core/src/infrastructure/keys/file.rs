use crate::foundation::util::encoding::decode_hex;
use crate::foundation::{EndorseError, KeyMaterial, SCALAR_SIZE};
use std::path::Path;
use zeroize::Zeroizing;

/// Read a private key from disk.
///
/// Accepts PEM (PKCS#8 or SEC1), a raw 32-byte scalar, or the scalar as hex text.
/// The content is not parsed as a curve key here; the signature engine does that per call.
pub fn load_key_material(path: &Path) -> Result<KeyMaterial, EndorseError> {
    let bytes = Zeroizing::new(read(path, "private key")?);
    if bytes.windows(b"-----BEGIN".len()).any(|window| window == b"-----BEGIN") {
        return Ok(KeyMaterial::pem(bytes.to_vec()));
    }
    if bytes.len() == SCALAR_SIZE {
        return Ok(KeyMaterial::raw_scalar(&bytes));
    }
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| EndorseError::config(format!("unrecognized private key format in {}", path.display())))?;
    let scalar = Zeroizing::new(
        decode_hex(text).map_err(|_| EndorseError::config(format!("unrecognized private key format in {}", path.display())))?,
    );
    if scalar.len() != SCALAR_SIZE {
        return Err(EndorseError::config(format!("hex private key in {} must be {SCALAR_SIZE} bytes, got {}", path.display(), scalar.len())));
    }
    Ok(KeyMaterial::raw_scalar(&scalar))
}

/// Certificate bytes as stored (PEM or DER); opaque to this crate.
pub fn load_certificate(path: &Path) -> Result<Vec<u8>, EndorseError> {
    let bytes = read(path, "certificate")?;
    if bytes.is_empty() {
        return Err(EndorseError::config(format!("certificate file {} is empty", path.display())));
    }
    Ok(bytes)
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>, EndorseError> {
    std::fs::read(path).map_err(|err| EndorseError::config(format!("cannot read {what} from {}: {err}", path.display())))
}
