//! Backoff policy for cached reads.

use std::{future::Future, time::Duration};

use bullpen_api::ClientError;
use tracing::warn;

const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Retries transport failures with exponential backoff. Validation, domain
/// and contract errors are returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn none() -> Self {
        Self::with_retries(0)
    }

    /// Delay before retry number `retry` (zero based): doubles each time, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut retry = 0;
        loop {
            match attempt().await {
                Err(error) if error.is_retryable() && retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!(
                        label,
                        retry = retry + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying read after transport failure"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bullpen_registry::Operation;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transport_error() -> ClientError {
        ClientError::Transport {
            operation: Operation::TeamsList,
            status: None,
            message: "connection refused".into(),
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(20), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_errors_are_retried_until_success() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let outcome = RetryPolicy::default()
            .run("teams.list", move || async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transport_error())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(outcome.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_at_the_limit() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let outcome: Result<(), _> = RetryPolicy::with_retries(1)
            .run("teams.list", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(transport_error())
            })
            .await;

        assert!(outcome.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn domain_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let outcome: Result<(), _> = RetryPolicy::default()
            .run("athletes.create", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Domain {
                    operation: Operation::AthletesCreate,
                    status: 400,
                    message: "name is required".into(),
                })
            })
            .await;

        assert!(outcome.unwrap_err().is_domain_status(400));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
