use crate::errors::{AdminError, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs `op` up to `max_attempts` times. After failed attempt `n` it sleeps
/// `backoff * n` before trying again. Only retryable errors are retried.
pub fn with_retry<T, F>(label: &str, max_attempts: u32, backoff: Duration, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=max_attempts {
        let start = Instant::now();

        match op(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    info!("{label} succeeded on attempt {attempt} in {:?}", start.elapsed());
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!(
                    "{label} attempt {attempt}/{max_attempts} failed in {:?}: {e}",
                    start.elapsed()
                );
                last_err = Some(e);

                if attempt < max_attempts {
                    std::thread::sleep(backoff * attempt);
                }
            }
        }
    }

    Err(last_err.unwrap_or_else(|| AdminError::Network(format!("{label} retry loop failed"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failure_then_success() {
        let mut calls = 0;
        let result = with_retry("query", 3, Duration::ZERO, |attempt| {
            calls += 1;
            if attempt == 1 {
                Err(AdminError::Network("connection reset".into()))
            } else {
                Ok(vec![1, 2, 3])
            }
        });
        assert_eq!(result.expect("second attempt"), vec![1, 2, 3]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<()> = with_retry("query", 3, Duration::ZERO, |_| {
            calls += 1;
            Err(AdminError::Service("Invalid URL".into()))
        });
        assert!(matches!(result, Err(AdminError::Service(msg)) if msg == "Invalid URL"));
        assert_eq!(calls, 3);
    }

    #[test]
    fn does_not_retry_user_errors() {
        let mut calls = 0;
        let result: Result<()> = with_retry("query", 5, Duration::ZERO, |_| {
            calls += 1;
            Err(AdminError::Validation("bad".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn backoff_grows_linearly() {
        let start = Instant::now();
        let _: Result<()> = with_retry("query", 3, Duration::from_millis(10), |_| {
            Err(AdminError::Network("down".into()))
        });
        // 10ms after the first failure, 20ms after the second, none after the last.
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
