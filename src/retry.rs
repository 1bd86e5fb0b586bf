//! Bounded retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// Attempt budget and backoff base for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1500),
        }
    }
}

/// Runs `op` until it succeeds or the attempt budget is spent.
///
/// After failed attempt `k` (1-indexed) the wrapper sleeps
/// `base_delay * k` before trying again; nothing sleeps after the final
/// attempt. The last error is propagated unchanged. A precondition
/// failure returns immediately, since no amount of retrying fixes an
/// input that can never succeed.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_precondition() || attempt >= attempts => return Err(e),
            Err(e) => {
                let delay = policy.base_delay * attempt;
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:.1}s",
                    attempt,
                    attempts,
                    e,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotatError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(base_ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = with_retry(policy(3, 1000), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(NotatError::Transcription(format!("attempt {} timed out", n)))
                } else {
                    Ok("transcript")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "transcript");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Linear backoff: 1s after the first failure, 2s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_propagates_last_error() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = with_retry(policy(3, 500), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(NotatError::Api(format!("boom on attempt {}", n))) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(result.unwrap_err().to_string().contains("attempt 3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_never_sleeps() {
        let started = tokio::time::Instant::now();

        let result = with_retry(policy(3, 1000), || async { Ok(7) }).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_precondition_failure_short_circuits() {
        let calls = AtomicU32::new(0);

        let result: Result<String> = with_retry(policy(3, 1000), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(NotatError::ChunkTooLarge {
                    path: "big.mp3".into(),
                    size_bytes: 30_000_000,
                    limit_bytes: 26_214_400,
                })
            }
        })
        .await;

        assert!(result.unwrap_err().is_precondition());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
