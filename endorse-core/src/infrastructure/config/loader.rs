//! Layered configuration on Figment.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (`ENDORSE_*`, nested with `__`)

use super::env::ENV_PREFIX;
use super::types::AppConfig;
use crate::foundation::EndorseError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::Path;
use tracing::{debug, info};

/// Load from `path` (optional on disk) plus environment overrides. Does not validate.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig, EndorseError> {
    info!(path = %path.display(), "loading configuration");
    let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        debug!(path = %path.display(), "configuration file missing; using defaults and env only");
    }
    // ENDORSE_CONFIG_PATH shares the prefix but is not a field.
    let figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG_PATH"]).split("__"));
    let config: AppConfig = figment.extract().map_err(|err| EndorseError::config(format!("config extraction failed: {err}")))?;
    debug!(
        endorsement_timeout_ms = config.endorsement.timeout_ms,
        commit_timeout_secs = config.commit.timeout_secs,
        discovery_enabled = config.discovery.enabled,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse a TOML document on top of the defaults, without environment overrides.
pub fn load_config_from_str(toml: &str) -> Result<AppConfig, EndorseError> {
    Figment::new()
        .merge(Serialized::defaults(AppConfig::default()))
        .merge(Toml::string(toml))
        .extract()
        .map_err(|err| EndorseError::config(format!("config extraction failed: {err}")))
}
