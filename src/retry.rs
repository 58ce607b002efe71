use log::warn;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Distinguishes failures worth another attempt from ones that are final.
pub enum RetryError<E> {
    /// Transient failure (timeouts, connection resets, 5xx, 429).
    Retryable(E),
    /// Anything a second attempt will not fix (4xx, malformed bodies).
    NonRetryable(E),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_delay_ms: u64,
    /// Jitter as a fraction of the delay (0.25 = ±25%).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 500,
            jitter_factor: 0.25,
        }
    }
}

/// Runs `func` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned on exhaustion.
pub async fn with_retry<F, Fut, T, E>(func: F, config: &RetryConfig) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
    E: Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match func().await {
            Ok(result) => return Ok(result),
            Err(RetryError::Retryable(err)) if attempt + 1 < max_attempts => {
                let delay = backoff_with_jitter(attempt, config);
                warn!(
                    "Retryable error: {}. Retry attempt {}/{} after {:?}",
                    err,
                    attempt + 1,
                    max_attempts - 1,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(RetryError::Retryable(err)) | Err(RetryError::NonRetryable(err)) => return Err(err),
        }
    }
}

/// Exponential backoff: base_delay * 2^attempt, plus random jitter of ±jitter_factor.
fn backoff_with_jitter(attempt: u32, config: &RetryConfig) -> Duration {
    let base_delay = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt));
    let jitter_range = (base_delay as f64 * config.jitter_factor) as u64;
    if jitter_range == 0 {
        return Duration::from_millis(base_delay);
    }
    let jitter = rand::rng().random_range(0..=jitter_range * 2) as i64 - jitter_range as i64;
    let delay_ms = (base_delay as i64 + jitter).max(0) as u64;
    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay_ms: 1,
            jitter_factor: 0.0,
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(RetryError::Retryable(format!("attempt {n} failed")))
                } else {
                    Ok(n)
                }
            },
            &fast_config(3),
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RetryError::Retryable("still down".to_string()))
            },
            &fast_config(2),
        )
        .await;

        assert_eq!(result, Err("still down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(RetryError::NonRetryable("bad request".to_string()))
            },
            &fast_config(5),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay_ms: 100,
            jitter_factor: 0.0,
        };
        assert_eq!(backoff_with_jitter(0, &config), Duration::from_millis(100));
        assert_eq!(backoff_with_jitter(1, &config), Duration::from_millis(200));
        assert_eq!(backoff_with_jitter(3, &config), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_jitter_stays_in_range() {
        let config = RetryConfig {
            max_attempts: 4,
            base_delay_ms: 1000,
            jitter_factor: 0.25,
        };
        for _ in 0..50 {
            let delay = backoff_with_jitter(0, &config).as_millis();
            assert!((750..=1250).contains(&delay), "delay {delay} out of range");
        }
    }
}
