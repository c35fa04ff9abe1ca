mod env;
mod loader;
mod types;
pub mod validation;

pub use env::{resolve_config_path, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use loader::{load_config_from_file, load_config_from_str};
pub use types::*;

use crate::foundation::EndorseError;
use std::path::Path;

/// Resolve the config path from `base_dir`, load and validate.
pub fn load_app_config(base_dir: &Path) -> Result<AppConfig, EndorseError> {
    load_app_config_from_path(&resolve_config_path(base_dir))
}

pub fn load_app_config_from_path(path: &Path) -> Result<AppConfig, EndorseError> {
    let config = load_config_from_file(path)?;
    config.validate().map_err(|errors| EndorseError::config(format!("validation failed: {}", errors.join("; "))))?;
    Ok(config)
}
