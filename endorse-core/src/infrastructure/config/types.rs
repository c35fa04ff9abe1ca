use crate::domain::{CommitStrategy, PeerEndpoint, QuorumRule};
use crate::foundation::{DEFAULT_COMMIT_TIMEOUT_SECS, DEFAULT_ENDORSEMENT_TIMEOUT_MS, DEFAULT_MAX_CONCURRENT_PEERS};
use crate::infrastructure::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endorsement: EndorsementConfig,
    pub commit: CommitConfig,
    pub discovery: DiscoveryConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndorsementConfig {
    /// Round timeout, measured from the end of discovery.
    pub timeout_ms: u64,
    pub max_concurrent_peers: usize,
    pub quorum: QuorumRule,
}

impl Default for EndorsementConfig {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_ENDORSEMENT_TIMEOUT_MS, max_concurrent_peers: DEFAULT_MAX_CONCURRENT_PEERS, quorum: QuorumRule::default() }
    }
}

impl EndorsementConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    /// Bounds submission, acknowledgement and the commit event wait together.
    pub timeout_secs: u64,
    pub strategy: CommitStrategy,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_COMMIT_TIMEOUT_SECS, strategy: CommitStrategy::default() }
    }
}

impl CommitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,
    /// Rewrite discovered hosts to `localhost` (networks running in local containers).
    pub as_localhost: bool,
    /// Used instead of discovery when `enabled = false`.
    pub static_peers: Vec<PeerEndpoint>,
    pub retry: RetryConfig,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { enabled: true, as_localhost: false, static_peers: Vec::new(), retry: RetryConfig::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filters: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filters: "info".to_string(), log_dir: None }
    }
}
