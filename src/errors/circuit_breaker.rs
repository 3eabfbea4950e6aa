//! Circuit breaker implementation

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};

/// Opens after a configured run of consecutive scan-cycle errors and holds
/// the monitoring loop back until the cooldown elapses.
pub struct CircuitBreaker {
    consecutive_errors: Arc<RwLock<u32>>,
    is_open: Arc<RwLock<bool>>,
    last_error_time: Arc<RwLock<Option<Instant>>>,
    max_consecutive_errors: u32,
    cooldown_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_errors: u32, cooldown_secs: u64) -> Self {
        Self {
            consecutive_errors: Arc::new(RwLock::new(0)),
            is_open: Arc::new(RwLock::new(false)),
            last_error_time: Arc::new(RwLock::new(None)),
            max_consecutive_errors,
            cooldown_duration: Duration::from_secs(cooldown_secs),
        }
    }

    pub async fn record_success(&self) {
        *self.consecutive_errors.write().await = 0;
        *self.is_open.write().await = false;
    }

    /// Returns true when this error tripped the breaker open.
    pub async fn record_error(&self) -> bool {
        let mut errors = self.consecutive_errors.write().await;
        *errors += 1;

        if *errors >= self.max_consecutive_errors {
            *self.is_open.write().await = true;
            *self.last_error_time.write().await = Some(Instant::now());
            error!("Circuit breaker OPEN after {} consecutive errors", *errors);
            return true;
        }
        false
    }

    pub async fn is_open(&self) -> bool {
        *self.is_open.read().await
    }

    pub async fn can_proceed(&self) -> bool {
        if !*self.is_open.read().await {
            return true;
        }

        if let Some(last_error) = *self.last_error_time.read().await {
            if last_error.elapsed() > self.cooldown_duration {
                info!("Circuit breaker cooldown complete, resetting");
                *self.is_open.write().await = false;
                *self.consecutive_errors.write().await = 0;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_and_resets_on_success() {
        let breaker = CircuitBreaker::new(2, 300);
        assert!(breaker.can_proceed().await);

        assert!(!breaker.record_error().await);
        assert!(breaker.record_error().await);
        assert!(!breaker.can_proceed().await);

        breaker.record_success().await;
        assert!(breaker.can_proceed().await);
    }

    #[tokio::test]
    async fn reopens_after_cooldown() {
        let breaker = CircuitBreaker::new(1, 0);
        breaker.record_error().await;
        // Zero-second cooldown elapses immediately.
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(breaker.can_proceed().await);
    }
}
