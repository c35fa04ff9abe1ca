use crate::foundation::{EndorseError, DEFAULT_DISCOVERY_BASE_DELAY_MS, DEFAULT_DISCOVERY_MAX_DELAY_MS, DEFAULT_DISCOVERY_RETRIES};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_DISCOVERY_RETRIES,
            base_delay_ms: DEFAULT_DISCOVERY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_DISCOVERY_MAX_DELAY_MS,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self { max_retries: 0, ..Self::default() }
    }

    /// Delay before retry number `retry_count` (1-based).
    pub fn delay_for_retry(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.saturating_sub(1) as i32;
        let base = (self.base_delay_ms as f64) * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(base.min(self.max_delay_ms as f64) as u64)
    }
}

/// Run `op`, retrying with exponential backoff while it fails with a retryable error.
pub async fn retry_with_backoff<F, Fut, T>(config: &RetryConfig, operation: &str, mut op: F) -> Result<T, EndorseError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EndorseError>>,
{
    let mut retries = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && retries < config.max_retries => {
                retries += 1;
                let delay = config.delay_for_retry(retries);
                tracing::warn!(operation, retry = retries, delay_ms = delay.as_millis() as u64, error = %err, "operation failed; retrying");
                sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
