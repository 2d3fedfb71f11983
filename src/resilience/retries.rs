//! Retry loop for unreachable backends.
//!
//! # Responsibilities
//! - Classify each attempt outcome as Success, Retryable, or Fatal
//! - Re-run Retryable attempts up to a small fixed ceiling with backoff
//! - Surface Fatal outcomes immediately
//!
//! # Design Decisions
//! - Only connection-level unreachability is Retryable; it covers the
//!   brief window while a backend restarts during a redeploy
//! - Timeouts are Fatal: retrying a timed-out operation risks duplicate
//!   side effects on the backend (document ingestion is not idempotent)
//! - Protocol errors are Fatal: a backend speaking garbage will not be
//!   cured by asking again

use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::proxy::ProxyOutcome;
use crate::resilience::backoff::calculate_backoff;

/// How one attempt outcome drives the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptClass {
    /// A response arrived; done, whatever the status code.
    Success,
    /// Worth another attempt within the ceiling.
    Retryable,
    /// Surfaced immediately, never retried.
    Fatal,
}

/// Classify a downstream outcome.
pub fn classify(outcome: &ProxyOutcome) -> AttemptClass {
    match outcome {
        ProxyOutcome::UpstreamResponse(_) => AttemptClass::Success,
        ProxyOutcome::UpstreamUnreachable => AttemptClass::Retryable,
        ProxyOutcome::UpstreamTimeout | ProxyOutcome::UpstreamProtocolError => AttemptClass::Fatal,
    }
}

/// Retry parameters, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempt ceiling per request (first try included).
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds.
    pub base_delay_ms: u64,
    /// Backoff delay cap in milliseconds.
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Build the policy from configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }

    /// Retry-After hint for callers after exhausting the ceiling.
    pub fn retry_after_secs(&self) -> u64 {
        (self.max_delay_ms / 1000).max(1)
    }
}

/// Run an attempt up to `attempt_ceiling` times.
///
/// The ceiling is passed per request because a non-replayable streamed
/// body caps the request at a single attempt regardless of policy.
/// Returns the final outcome and the number of attempts made.
pub async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    attempt_ceiling: u32,
    mut attempt: F,
) -> (ProxyOutcome, u32)
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ProxyOutcome>,
{
    let ceiling = attempt_ceiling.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let outcome = attempt(attempts).await;

        match classify(&outcome) {
            AttemptClass::Success | AttemptClass::Fatal => return (outcome, attempts),
            AttemptClass::Retryable => {
                if attempts >= ceiling {
                    return (outcome, attempts);
                }
                let delay = calculate_backoff(attempts, policy.base_delay_ms, policy.max_delay_ms);
                tracing::info!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "backend unreachable, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
