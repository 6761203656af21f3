//! Bounded retry for transactional units that can lose a write race

use std::future::Future;
use std::time::Duration;

use binge_core::error::DomainError;
use binge_core::traits::RepoResult;
use rand::Rng;
use tracing::{debug, warn};

/// Why a single attempt of a unit did not commit
#[derive(Debug)]
pub enum AttemptError {
    /// Lost a race with a concurrent writer; the whole unit may run again
    Conflict(String),
    /// Anything else; returned to the caller as-is
    Fatal(DomainError),
}

impl From<DomainError> for AttemptError {
    fn from(e: DomainError) -> Self {
        Self::Fatal(e)
    }
}

/// Attempt budget and backoff shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Upper bound of the sleep before attempt `attempt + 1`
    fn ceiling(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Full-jitter delay in `[0, ceiling]`
    fn backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        if ceiling.is_zero() {
            return ceiling;
        }
        let micros = rand::thread_rng().gen_range(0..=ceiling.as_micros() as u64);
        Duration::from_micros(micros)
    }
}

/// Run `unit` until it commits, a fatal error occurs, or the budget runs out
///
/// `unit` receives the 1-based attempt number. Exhausting the budget yields
/// [`DomainError::TransientStoreConflict`].
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut unit: F,
) -> RepoResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match unit(attempt).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Conflict(reason)) => {
                debug!(operation, attempt, %reason, "Write conflict, retrying");
                if attempt < max_attempts {
                    let delay = policy.backoff(attempt);
                    if delay.is_zero() {
                        tokio::task::yield_now().await;
                    } else {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    warn!(operation, attempts = max_attempts, "Retry budget exhausted");
    Err(DomainError::TransientStoreConflict {
        attempts: max_attempts,
    })
}
