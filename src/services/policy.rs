use crate::error::ServiceError;
use std::future::Future;
use std::time::Duration;

/// Timeout and retry rules applied to every collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl CallPolicy {
    pub fn new(timeout: Duration, max_retries: u32, backoff: Duration) -> Self {
        Self {
            timeout,
            max_retries,
            backoff,
        }
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or runs out
    /// of retries.
    ///
    /// Each attempt is bounded by `timeout`; an elapsed attempt counts as
    /// `ServiceError::Timeout`. Between attempts the policy waits `backoff * attempt`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ServiceError::Timeout {
                    operation: operation.to_string(),
                    after: self.timeout,
                }),
            };

            match outcome {
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    let wait = self.backoff * attempt;
                    tracing::warn!(operation, attempt, ?wait, error = %err, "retrying collaborator call");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 2, Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> CallPolicy {
        CallPolicy::new(Duration::from_millis(100), 2, Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn retries_unavailable_then_succeeds() {
        let calls = &AtomicU32::new(0);
        let result = policy()
            .run("flaky", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ServiceError::Unavailable("warming up".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("down", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::Unavailable("down".into()))
            })
            .await;
        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("slow", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        match result {
            Err(ServiceError::Timeout { operation, after }) => {
                assert_eq!(operation, "slow");
                assert_eq!(after, Duration::from_millis(100));
            }
            other => panic!("expected a timeout, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_errors_return_at_once() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = policy()
            .run("send_code", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ServiceError::InvalidContact("12".into()))
            })
            .await;
        assert_eq!(result, Err(ServiceError::InvalidContact("12".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
