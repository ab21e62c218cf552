//! Retrying executor with exponential backoff, jitter, and cancellation.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use shared::error::RemoteError;
use tokio::sync::watch;

use crate::classifier::classify;
use crate::outcome::Outcome;

/// Bounds on attempt count and backoff shape for a retried operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first attempt. Always >= 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy for operations that must not be re-run automatically.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Exponential backoff before the retry that follows `attempt`
    /// (1-indexed), capped at `max_delay`. Jitter is applied separately.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        self.base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay)
    }
}

/// Observability callback invoked before each backoff wait. Performs no
/// output itself; side effects belong to the caller.
pub type OnRetry<'a> = &'a (dyn Fn(u32, &Outcome, Duration) + Send + Sync);

/// Run `op` under `policy`, classifying each failure to decide whether to
/// retry. Returns the operation's success value or the classification of the
/// failure that ended the attempt loop.
///
/// Cancellation (the watch flipping to `true`, or its sender being dropped)
/// is checked before each attempt and for the whole duration of every backoff
/// wait; it always wins over continuing to retry.
pub async fn execute<T, F, Fut>(
    op: F,
    policy: &RetryPolicy,
    on_retry: Option<OnRetry<'_>>,
    cancel: &mut watch::Receiver<bool>,
) -> Result<T, Outcome>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        if *cancel.borrow() {
            return Err(Outcome::cancelled());
        }

        let failure = match op().await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };

        let outcome = classify(&failure);
        if !outcome.retryable || attempt == max_attempts {
            return Err(outcome);
        }

        // Server-directed delay takes precedence over the computed backoff.
        let mut delay = match outcome.retry_after {
            Some(hint) if hint > Duration::ZERO => hint,
            _ => policy.backoff_delay(attempt),
        };
        if policy.jitter {
            delay += jitter_for(delay);
        }

        if let Some(callback) = on_retry {
            callback(attempt, &outcome, delay);
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = wait_cancelled(cancel) => return Err(Outcome::cancelled()),
        }
    }

    unreachable!("attempt loop returns on the final attempt")
}

/// Up to 10% additive random delay, avoiding synchronized retry storms.
fn jitter_for(delay: Duration) -> Duration {
    let cap = delay.as_millis() as u64 / 10;
    if cap == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=cap))
}

async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow() {
        // A dropped sender means the session is gone; treat as cancelled.
        if cancel.changed().await.is_err() {
            break;
        }
    }
}

#[cfg(test)]
#[path = "tests/retry_tests.rs"]
mod tests;
