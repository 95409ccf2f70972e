use std::{future::Future, time::Duration};

use crate::error::Res;

/// Bounded exponential backoff for storage writes.
///
/// The delay starts at `initial_delay`, doubles after every failed attempt and
/// never exceeds `max_delay`. At most `max_attempts` attempts are made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

/// Runs `op` until it succeeds, fails permanently, or the policy runs out of
/// attempts. Only errors reporting [`AppError::is_transient`] are retried.
///
/// [`AppError::is_transient`]: crate::error::AppError::is_transient
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Res<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Res<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    log::info!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                log::warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                    label,
                    attempt,
                    max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                if error.is_transient() {
                    log::error!("{} gave up after {} attempts: {}", label, attempt, error);
                }
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = policy(10);
        assert_eq!(policy.delay_after(1), Duration::from_millis(10));
        assert_eq!(policy.delay_after(2), Duration::from_millis(20));
        assert_eq!(policy.delay_after(3), Duration::from_millis(40));
        assert_eq!(policy.delay_after(4), Duration::from_millis(40));
        assert_eq!(policy.delay_after(64), Duration::from_millis(40));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = retry_transient(&policy(5), "insert developer", || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AppError::Unavailable("connection reset".to_string()))
                } else {
                    Ok("saved")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "saved");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Res<()> = retry_transient(&policy(5), "insert developer", || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::BadRequest("Email already exists".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Res<()> = retry_transient(&policy(3), "insert developer", || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Unavailable("connection refused".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = retry_transient(&policy(0), "insert developer", || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>(())
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
