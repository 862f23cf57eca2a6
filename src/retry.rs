// Retry discipline for the storage collaborator. Only transient storage
// failures are retried; domain errors never reach this layer, so a
// `Conflict` can never loop here.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::StorageError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 2000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Exponential backoff with jitter to prevent thundering herd.
pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
    let base_backoff_ms = (config.initial_backoff_ms as f64
        * config.backoff_multiplier.powf(retry_attempt as f64))
    .min(config.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}

/// Runs a storage operation, retrying transient failures up to
/// `max_retries` times with backoff. Non-transient failures surface
/// immediately.
pub fn with_retry<T, F>(config: &RetryConfig, mut op: F) -> Result<T, StorageError>
where
    F: FnMut() -> Result<T, StorageError>,
{
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < config.max_retries => {
                warn!(attempt, error = %err, "transient storage failure, backing off");
                thread::sleep(calculate_backoff(attempt, config));
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
