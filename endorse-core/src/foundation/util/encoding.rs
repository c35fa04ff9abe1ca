use crate::foundation::EndorseError;

/// Decode hex, tolerating surrounding whitespace and an optional `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, EndorseError> {
    let trimmed = s.trim();
    let stripped = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")).unwrap_or(trimmed);
    hex::decode(stripped).map_err(|e| e.into())
}

pub fn parse_hex_32bytes(s: &str) -> Result<[u8; 32], EndorseError> {
    let bytes = decode_hex(s)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| EndorseError::SerializationError { format: "hex".to_string(), details: format!("expected 32 bytes, got {}", bytes.len()) })
}
