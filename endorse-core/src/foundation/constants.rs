/// SHA-256 output size.
pub const DIGEST_SIZE: usize = 32;

/// Size of a P-256 scalar (`r`, `s`, private key) in bytes.
pub const SCALAR_SIZE: usize = 32;

/// Size of the per-proposal nonce mixed into the transaction id.
pub const NONCE_SIZE: usize = 24;

/// Version byte prefixed to every canonical payload envelope.
pub const PAYLOAD_ENCODING_VERSION: u8 = 1;

pub const DEFAULT_ENDORSEMENT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_CONCURRENT_PEERS: usize = 16;
pub const DEFAULT_COMMIT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_DISCOVERY_RETRIES: u32 = 3;
pub const DEFAULT_DISCOVERY_BASE_DELAY_MS: u64 = 250;
pub const DEFAULT_DISCOVERY_MAX_DELAY_MS: u64 = 5_000;

/// Domain separator for nonces derived from request contents.
pub const DERIVED_NONCE_DOMAIN: &[u8] = b"endorse/derived-nonce/v1";
