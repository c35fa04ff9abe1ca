use std::path::{Path, PathBuf};

/// Explicit config file path.
pub const CONFIG_PATH_ENV: &str = "ENDORSE_CONFIG_PATH";
/// Prefix for field overrides, nested with `__` (`ENDORSE_COMMIT__TIMEOUT_SECS`).
pub const ENV_PREFIX: &str = "ENDORSE_";
pub const DEFAULT_CONFIG_FILE: &str = "endorse.toml";

/// `ENDORSE_CONFIG_PATH` when set, otherwise `endorse.toml` in `base_dir`.
pub fn resolve_config_path(base_dir: &Path) -> PathBuf {
    if let Ok(value) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    base_dir.join(DEFAULT_CONFIG_FILE)
}
