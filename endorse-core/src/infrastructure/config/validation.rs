use super::types::AppConfig;

impl AppConfig {
    /// Every violation, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.endorsement.timeout_ms == 0 {
            errors.push("endorsement.timeout_ms must be > 0".to_string());
        }
        if self.endorsement.max_concurrent_peers == 0 {
            errors.push("endorsement.max_concurrent_peers must be > 0".to_string());
        }
        if let crate::domain::QuorumRule::Policy(policy) = &self.endorsement.quorum {
            if let Err(err) = policy.validate() {
                errors.push(format!("endorsement.quorum: {err}"));
            }
        }

        if self.commit.timeout_secs == 0 {
            errors.push("commit.timeout_secs must be > 0".to_string());
        }

        if !self.discovery.enabled && self.discovery.static_peers.is_empty() {
            errors.push("discovery.static_peers must not be empty when discovery.enabled = false".to_string());
        }
        for peer in &self.discovery.static_peers {
            if peer.name.is_blank() || peer.msp_id.is_blank() || peer.url.trim().is_empty() {
                errors.push(format!("discovery.static_peers entry is incomplete: {peer}"));
            }
        }
        if self.discovery.retry.backoff_multiplier < 1.0 {
            errors.push("discovery.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.discovery.retry.base_delay_ms > self.discovery.retry.max_delay_ms {
            errors.push("discovery.retry.base_delay_ms cannot exceed max_delay_ms".to_string());
        }

        if self.logging.filters.trim().is_empty() {
            errors.push("logging.filters must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
