//! Per-provider admission control: in-flight cap, pacing, and backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::trace;

/// Retry schedule for retryable fault categories.
///
/// Delay for the n-th retry (0-based) is
/// `min(base_delay * 2^n, max_delay) + jitter * delay * random[0, 1)`.
/// A provider-supplied retry-after hint replaces the exponential base for
/// that attempt; jitter still applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Backoff before the given 0-based retry, honoring a retry-after hint.
    pub(super) fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let base_ms = match retry_after {
            Some(hint) => hint.as_millis() as u64,
            None => {
                let exp = self
                    .base_delay
                    .as_millis()
                    .saturating_mul(1u128 << retry.min(32)) as u64;
                exp.min(self.max_delay.as_millis() as u64)
            }
        };
        let jitter_ms = (self.jitter * base_ms as f64 * rand::random::<f64>()) as u64;
        Duration::from_millis(base_ms + jitter_ms)
    }
}

/// Per-provider invocation limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyConfig {
    /// Maximum concurrent calls per provider.
    pub max_in_flight: usize,
    /// Pacing budget; calls are spaced at least `60s / rpm` apart.
    pub requests_per_minute: u32,
    /// Hard per-call timeout; an elapsed call is classified transient.
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 3,
            requests_per_minute: 10,
            call_timeout: Duration::from_secs(90),
            retry: RetryPolicy::default(),
        }
    }
}

impl PolicyConfig {
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    #[must_use]
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm.max(1);
        self
    }

    #[must_use]
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(super) fn min_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.requests_per_minute.max(1) as f64)
    }
}

/// Admission gate for one provider: counting semaphore plus a pacer that
/// spaces call starts by the minimum interval.
pub(super) struct ProviderGate {
    semaphore: Arc<Semaphore>,
    next_slot: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl ProviderGate {
    pub(super) fn new(config: &PolicyConfig) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            next_slot: Mutex::new(None),
            min_interval: config.min_interval(),
        }
    }

    /// Wait for an in-flight slot and the next pacing slot.
    ///
    /// Returns the permit (held for the duration of the call) and the time
    /// spent waiting for admission.
    pub(super) async fn admit(&self, provider: &str) -> (OwnedSemaphorePermit, Duration) {
        let started = Instant::now();
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("provider semaphore closed");

        let wait = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = next.map_or(now, |at| at.max(now));
            *next = Some(slot + self.min_interval);
            slot.saturating_duration_since(now)
        };
        if !wait.is_zero() {
            trace!(provider, wait_ms = wait.as_millis() as u64, "pacing provider call");
            tokio::time::sleep(wait).await;
        }

        (permit, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_bounded_and_nondecreasing_at_base() {
        let policy = RetryPolicy::default();
        for retry in 0..6 {
            let delay = policy.delay(retry, None);
            let base = (policy.base_delay.as_millis() as u64)
                .saturating_mul(1 << retry)
                .min(policy.max_delay.as_millis() as u64);
            assert!(delay >= Duration::from_millis(base));
            let ceiling = base + (policy.jitter * base as f64) as u64 + 1;
            assert!(delay <= Duration::from_millis(ceiling));
        }
    }

    #[test]
    fn retry_after_overrides_exponential_base() {
        let policy = RetryPolicy::default();
        let hint = Duration::from_secs(7);
        let delay = policy.delay(5, Some(hint));
        assert!(delay >= hint);
        assert!(delay <= hint + Duration::from_secs_f64(7.0 * policy.jitter) + Duration::from_millis(1));
    }

    #[test]
    fn min_interval_from_rpm() {
        let config = PolicyConfig::default().with_requests_per_minute(10);
        assert_eq!(config.min_interval(), Duration::from_secs(6));
    }
}
