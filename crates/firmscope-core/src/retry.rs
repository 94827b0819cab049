//! Bounded retry with exponential backoff for collector transport calls.
//!
//! Retries cover transient transport faults only: connect failures, request
//! timeouts, and retryable upstream statuses. A definitive "not found" is a
//! parsing outcome, not a transport fault, and never reaches this layer.

use std::sync::Arc;
use std::time::Duration;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed { delay: Duration },
    /// Exponential delay: `base * factor^attempt`, capped at `max`, with
    /// optional +/- 50% jitter to avoid retry bursts against one upstream.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let capped = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let mut delay = Duration::from_secs_f64(capped);

                if jitter {
                    let half_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=half_ms.saturating_mul(2));
                    let total = delay.as_millis() as i64 + (offset as i64 - half_ms as i64);
                    delay = Duration::from_millis(total.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Retry policy for one collector's transport.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Upstream statuses treated as transient.
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    fn should_retry_error(&self, error: &HttpError) -> bool {
        if error.is_timeout() {
            return self.retry_on_timeout;
        }
        error.retryable() && self.retry_on_connect
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Execute a request, retrying transient failures per the policy.
///
/// Returns the last response even when its status is retryable and the
/// budget ran out; status interpretation belongs to the caller.
pub async fn execute_with_retry(
    client: &Arc<dyn HttpClient>,
    request: &HttpRequest,
    config: &RetryConfig,
) -> Result<HttpResponse, HttpError> {
    let attempts = if config.enabled {
        config.max_retries + 1
    } else {
        1
    };

    let mut last_error = None;
    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(config.delay_for_attempt(attempt - 1)).await;
        }

        match client.execute(request.clone()).await {
            Ok(response) => {
                let retryable_status =
                    !response.is_success() && config.should_retry_status(response.status);
                if retryable_status && attempt + 1 < attempts {
                    tracing::debug!(
                        status = response.status,
                        attempt,
                        url = request.url.as_str(),
                        "retrying on upstream status"
                    );
                    continue;
                }
                return Ok(response);
            }
            Err(error) => {
                if config.should_retry_error(&error) && attempt + 1 < attempts {
                    tracing::debug!(
                        error = %error,
                        attempt,
                        url = request.url.as_str(),
                        "retrying on transport error"
                    );
                    last_error = Some(error);
                    continue;
                }
                return Err(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| HttpError::new("retry budget exhausted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(7), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(2), Duration::from_millis(400));
        assert_eq!(backoff.delay(4), Duration::from_secs(1));
    }

    #[test]
    fn jittered_backoff_stays_within_half_window() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        };

        for attempt in 0..4 {
            let expected = (200.0 * 2_f64.powi(attempt as i32)).min(2_000.0);
            let delay_ms = backoff.delay(attempt).as_millis() as f64;
            assert!(delay_ms >= expected * 0.49, "attempt={attempt} delay={delay_ms}");
            assert!(delay_ms <= expected * 1.51, "attempt={attempt} delay={delay_ms}");
        }
    }

    #[test]
    fn default_config_retries_transient_statuses_only() {
        let config = RetryConfig::default();
        assert!(config.should_retry_status(429));
        assert!(config.should_retry_status(503));
        assert!(!config.should_retry_status(404));
        assert!(!config.should_retry_status(403));
    }

    struct FlakyClient {
        calls: AtomicU32,
        fail_first: u32,
    }

    impl HttpClient for FlakyClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call < self.fail_first {
                    Err(HttpError::new("connection failed: refused"))
                } else {
                    Ok(HttpResponse::ok_html("<html>ok</html>"))
                }
            })
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_transport_failures() {
        let client: Arc<dyn HttpClient> = Arc::new(FlakyClient {
            calls: AtomicU32::new(0),
            fail_first: 2,
        });
        let config = RetryConfig {
            backoff: Backoff::Fixed {
                delay: Duration::from_millis(1),
            },
            max_retries: 2,
            ..RetryConfig::default()
        };

        let response = execute_with_retry(&client, &HttpRequest::get("https://example.test"), &config)
            .await
            .expect("third attempt succeeds");
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn disabled_retry_fails_on_first_error() {
        let client: Arc<dyn HttpClient> = Arc::new(FlakyClient {
            calls: AtomicU32::new(0),
            fail_first: 1,
        });

        let result = execute_with_retry(
            &client,
            &HttpRequest::get("https://example.test"),
            &RetryConfig::no_retry(),
        )
        .await;
        assert!(result.is_err());
    }
}
