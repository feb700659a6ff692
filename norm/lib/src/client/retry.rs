//! Bounded retry envelope for remote calls.
//!
//! Every Notion request goes through [`with_retry`]: up to
//! `RetryPolicy::max_attempts` attempts with a linearly increasing pause
//! between them. Permanent failures (not found, unauthorized, rejected
//! request bodies, deadline exceeded) are returned immediately.

use std::future::Future;

use tracing::warn;

use crate::config::RetryPolicy;
use crate::error::RemoteError;

/// Runs `operation` under the retry policy.
///
/// ## Errors
///
/// Returns the first non-retryable error, or the last error once all attempts
/// are exhausted.
///
/// ## Examples
///
/// ```
/// use norm_lib::client::with_retry;
/// use norm_lib::config::RetryPolicy;
/// use norm_lib::error::RemoteError;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let value = with_retry(RetryPolicy::default(), "example", || async {
///     Ok::<_, RemoteError>(42)
/// })
/// .await
/// .unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
#[tracing::instrument(skip(policy, operation))]
pub async fn with_retry<F, Fut, T>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    operation_name, attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn transient() -> RemoteError {
        RemoteError::HttpStatus {
            status: 503,
            code: "service_unavailable".to_string(),
            message: "try later".to_string(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let result = with_retry(policy(), "op", || async { Ok::<i32, RemoteError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(policy(), "op", move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(transient())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_linear() {
        let start = tokio::time::Instant::now();
        let result = with_retry(policy(), "op", || async { Err::<(), _>(transient()) }).await;

        assert!(result.is_err());
        // 1 × 100ms after the first attempt, 2 × 100ms after the second
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_surface_last_error() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(policy(), "op", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(transient())
            }
        })
        .await;

        assert!(matches!(result, Err(RemoteError::HttpStatus { status: 503, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = with_retry(policy(), "op", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(RemoteError::NotFound {
                    object: "database",
                    id: "db1".to_string(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(RemoteError::NotFound { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
