//! Retry logic with exponential backoff
//!
//! Retries live here, at the transport layer. The aggregator and the
//! evaluator never retry on their own; a venue or criterion that fails
//! after the transport gave up is folded into results as absent.

use std::time::Duration;
use anyhow::Result;
use tracing::warn;
use crate::errors::{AgentError, AgentResult};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short fuse for calls sitting under a per-venue timeout.
    pub fn quick() -> Self {
        Self {
            max_attempts: 2,
            initial_delay_ms: 50,
            max_delay_ms: 500,
            ..Default::default()
        }
    }
}

pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> AgentResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay_ms;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= config.max_attempts => {
                return Err(AgentError::Network {
                    message: format!("{} failed after {} attempts", context, attempt),
                    source: Some(e),
                    retry_count: attempt,
                });
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                    attempt, config.max_attempts, context, e, delay
                );

                tokio::time::sleep(Duration::from_millis(delay)).await;

                delay = ((delay as f64) * config.exponential_base) as u64;
                delay = delay.min(config.max_delay_ms);
                // Up to 10% additive jitter to de-synchronize callers.
                let jitter = (delay as f64 * 0.1 * rand::random::<f64>()) as u64;
                delay = delay.saturating_add(jitter);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    anyhow::bail!("transient");
                }
                Ok(7u32)
            },
            &RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                exponential_base: 2.0,
            },
            "test op",
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AgentResult<()> = retry_with_backoff(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("down")
            },
            &RetryConfig {
                max_attempts: 2,
                initial_delay_ms: 1,
                max_delay_ms: 2,
                exponential_base: 2.0,
            },
            "test op",
        )
        .await;

        assert!(matches!(
            result,
            Err(AgentError::Network { retry_count: 2, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
