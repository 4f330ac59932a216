use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry configuration, either for a pipeline stage's attempt budget or for
/// a lower-level collaborator operation (database, object store).
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Multiplier applied per subsequent retry. `1.0` means fixed backoff.
    pub backoff_multiplier: f64,
    /// Upper bound on backoff regardless of multiplier growth.
    pub max_backoff: Duration,
}

impl RetryConfig {
    /// Prepare stage: 3 attempts, fixed 60s backoff (§4.1).
    pub fn prepare() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(60),
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(60),
        }
    }

    /// Transcode fan-out child: 2 attempts, fixed 30s backoff.
    pub fn transcode() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_secs(30),
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(30),
        }
    }

    /// Segment stage: 2 attempts at the stage level (§4.5 resolves the
    /// retry-entire-stage-vs-per-quality ambiguity in favor of stage-level
    /// retry with per-quality skip on exhaustion).
    pub fn segment() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_secs(15),
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(15),
        }
    }

    /// Manifest stage: 2 attempts, short fixed backoff (pure local I/O).
    pub fn manifest() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_secs(5),
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Upload stage: 3 attempts, exponential backoff (network-bound).
    pub fn upload() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(60),
        }
    }

    /// Finalize stage: single attempt, no retry budget (§4.1).
    pub fn finalize() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(0),
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(0),
        }
    }

    /// Configuration for database operations (3 retries: 100ms, 200ms, 400ms).
    pub fn database() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_millis(400),
        }
    }

    /// Configuration for S3 operations (3 retries with exponential backoff).
    pub fn storage() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(2),
        }
    }

    /// Calculate backoff duration for a given attempt number.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }

        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);

        let backoff = Duration::from_millis(backoff_ms as u64);

        if backoff > self.max_backoff {
            self.max_backoff
        } else {
            backoff
        }
    }
}

/// Retry a future with the given backoff policy.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: RetryConfig,
    operation_name: &str,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= config.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %err,
                        "Operation failed after all retry attempts"
                    );
                    return Err(err);
                }

                let backoff = config.backoff_duration(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    backoff_ms = backoff.as_millis(),
                    error = %err,
                    "Operation failed, retrying after backoff"
                );

                sleep(backoff).await;
            }
        }
    }
}

/// Retry a database operation with the standard database retry configuration.
pub async fn retry_database<F, Fut, T>(operation_name: &str, f: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    retry_with_backoff(RetryConfig::database(), operation_name, f).await
}

/// Retry a storage operation with the standard storage retry configuration.
pub async fn retry_storage<F, Fut, T, E>(operation_name: &str, f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(RetryConfig::storage(), operation_name, f).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn prepare_retry_config_matches_stage_policy() {
        let config = RetryConfig::prepare();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_duration(1), Duration::from_secs(60));
        assert_eq!(config.backoff_duration(2), Duration::from_secs(60));
    }

    #[test]
    fn finalize_retry_config_has_single_attempt() {
        assert_eq!(RetryConfig::finalize().max_attempts, 1);
    }

    #[test]
    fn upload_retry_config_backs_off_exponentially() {
        let config = RetryConfig::upload();
        assert_eq!(config.backoff_duration(1), Duration::from_secs(10));
        assert_eq!(config.backoff_duration(2), Duration::from_secs(20));
        assert_eq!(config.backoff_duration(3), Duration::from_secs(40));
    }

    #[test]
    fn database_retry_config_backs_off_exponentially() {
        let config = RetryConfig::database();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_duration(1), Duration::from_millis(100));
        assert_eq!(config.backoff_duration(2), Duration::from_millis(200));
        assert_eq!(config.backoff_duration(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(RetryConfig::database(), "test_operation", || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("success")
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_succeeds_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(RetryConfig::database(), "test_operation", || {
            let counter = counter_clone.clone();
            async move {
                let count = counter.fetch_add(1, Ordering::SeqCst);
                if count < 2 {
                    Err("temporary failure")
                } else {
                    Ok::<_, &str>("success")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("success"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_fails_after_max_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(RetryConfig::database(), "test_operation", || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>("persistent failure")
            }
        })
        .await;

        assert_eq!(result, Err("persistent failure"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_duration_caps_at_max() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(1),
        };

        assert!(config.backoff_duration(5) <= Duration::from_secs(1));
        assert!(config.backoff_duration(10) <= Duration::from_secs(1));
    }
}
