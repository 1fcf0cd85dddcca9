//! The shared invocation policy registry.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::classify::{classify, ErrorCategory, ProviderFault};
use super::invoker::{PolicyConfig, ProviderGate};

/// Outcome of one governed provider invocation.
#[derive(Clone, Debug)]
pub struct InvocationResult {
    pub success: bool,
    pub payload: Option<Value>,
    /// Number of calls actually dispatched.
    pub attempts: u32,
    /// Total time spent waiting on admission, pacing, and backoff.
    pub total_wait: Duration,
    pub final_error: Option<String>,
    pub category: Option<ErrorCategory>,
}

impl InvocationResult {
    fn success(payload: Value, attempts: u32, total_wait: Duration) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            attempts,
            total_wait,
            final_error: None,
            category: None,
        }
    }

    fn failure(
        fault: &ProviderFault,
        category: ErrorCategory,
        attempts: u32,
        total_wait: Duration,
    ) -> Self {
        Self {
            success: false,
            payload: None,
            attempts,
            total_wait,
            final_error: Some(fault.to_string()),
            category: Some(category),
        }
    }

    fn cancelled(attempts: u32, total_wait: Duration) -> Self {
        Self {
            success: false,
            payload: None,
            attempts,
            total_wait,
            final_error: Some("invocation cancelled".to_string()),
            category: None,
        }
    }
}

/// Shared registry of per-provider admission gates.
///
/// One instance is constructed at process start and shared by reference;
/// gates are created lazily the first time a provider is invoked, all with
/// the same [`PolicyConfig`].
pub struct PolicyRegistry {
    config: PolicyConfig,
    gates: Mutex<FxHashMap<String, Arc<ProviderGate>>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl PolicyRegistry {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            gates: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    fn gate(&self, provider: &str) -> Arc<ProviderGate> {
        let mut gates = self.gates.lock().expect("policy gate map poisoned");
        gates
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(ProviderGate::new(&self.config)))
            .clone()
    }

    /// Run a provider call under the full invocation policy.
    ///
    /// Admission (in-flight cap plus pacing) precedes every attempt, each
    /// attempt is bounded by the per-call timeout, and retryable faults are
    /// retried with exponential backoff and jitter up to the attempt limit.
    /// The cancellation token is observed before each attempt, after each
    /// attempt resolves, and during every backoff sleep; a result that
    /// arrives after cancellation is discarded.
    ///
    /// The closure receives the 1-based attempt number.
    #[instrument(skip(self, cancel, op))]
    pub async fn invoke<F, Fut>(
        &self,
        provider: &str,
        cancel: &CancellationToken,
        op: F,
    ) -> InvocationResult
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Value, ProviderFault>>,
    {
        let gate = self.gate(provider);
        let mut attempts: u32 = 0;
        let mut total_wait = Duration::ZERO;

        loop {
            if cancel.is_cancelled() {
                return InvocationResult::cancelled(attempts, total_wait);
            }

            let (permit, admission_wait) = gate.admit(provider).await;
            total_wait += admission_wait;
            attempts += 1;

            let outcome = tokio::time::timeout(self.config.call_timeout, op(attempts)).await;
            drop(permit);

            // A result that lands after cancellation is discarded, success
            // included; the caller asked for the job to stop.
            if cancel.is_cancelled() {
                debug!(provider, attempts, "discarding in-flight result, invocation cancelled");
                return InvocationResult::cancelled(attempts, total_wait);
            }

            let fault = match outcome {
                Ok(Ok(payload)) => {
                    return InvocationResult::success(payload, attempts, total_wait);
                }
                Ok(Err(fault)) => fault,
                Err(_) => ProviderFault::msg(format!(
                    "call timed out after {:?}",
                    self.config.call_timeout
                )),
            };

            let category = classify(&fault);
            if !category.is_retryable() || attempts >= self.config.retry.max_attempts {
                warn!(
                    provider,
                    attempts,
                    %category,
                    error = %fault,
                    "provider invocation failed"
                );
                return InvocationResult::failure(&fault, category, attempts, total_wait);
            }

            let delay = self.config.retry.delay(attempts - 1, fault.retry_after);
            warn!(
                provider,
                attempt = attempts,
                %category,
                delay_ms = delay.as_millis() as u64,
                error = %fault,
                "retrying provider invocation"
            );

            tokio::select! {
                _ = cancel.cancelled() => {
                    return InvocationResult::cancelled(attempts, total_wait);
                }
                _ = tokio::time::sleep(delay) => {
                    total_wait += delay;
                }
            }
        }
    }
}
