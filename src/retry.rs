//! Bounded, classified retry for remote calls.
//!
//! A single primitive wraps any fallible async operation: failures are
//! classified by the caller, fatal ones propagate immediately, retryable
//! ones are re-attempted after a fixed backoff until the attempt budget is
//! spent. `max_retries == 0` means a single attempt with no retry.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How a failure should be treated by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Worth another attempt if budget remains.
    Retryable,
    /// Propagate immediately regardless of remaining attempts.
    Fatal,
}

/// Execute `op`, retrying classified-retryable failures up to `max_retries`
/// extra times with a fixed `backoff` between attempts.
///
/// The last failure is returned once the budget is exhausted.
pub async fn with_retry<T, E, F, Fut, C>(
    max_retries: u32,
    backoff: Duration,
    classify: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> RetryClass,
{
    let mut remaining = max_retries;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if classify(&e) == RetryClass::Fatal => return Err(e),
            Err(e) => {
                if remaining == 0 {
                    return Err(e);
                }
                remaining -= 1;
                warn!(
                    "operation failed, retrying ({} attempt(s) left): {}",
                    remaining + 1,
                    e
                );
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn retryable(_: &&'static str) -> RetryClass {
        RetryClass::Retryable
    }

    fn fatal(_: &&'static str) -> RetryClass {
        RetryClass::Fatal
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Cell::new(0u32);
        let result = with_retry(3, Duration::ZERO, retryable, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, &'static str>(7) }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_retries_until_budget_exhausted() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = with_retry(2, Duration::ZERO, retryable, || {
            calls.set(calls.get() + 1);
            async { Err("boom") }
        })
        .await;

        assert_eq!(result, Err("boom"));
        // One initial attempt plus two retries.
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = Cell::new(0u32);
        let result = with_retry(5, Duration::ZERO, retryable, || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err("flaky")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_fatal_errors_never_retry() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = with_retry(2, Duration::ZERO, fatal, || {
            calls.set(calls.get() + 1);
            async { Err("bad input") }
        })
        .await;

        assert_eq!(result, Err("bad input"));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_means_single_attempt() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = with_retry(0, Duration::ZERO, retryable, || {
            calls.set(calls.get() + 1);
            async { Err("boom") }
        })
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(calls.get(), 1);
    }
}
