//! Bounded retry for transport-level failures.
//!
//! Only failures that produced no HTTP response are retried. A response
//! with any status code is returned to the caller as-is, so server verdicts
//! and protocol errors are never repeated.

use crate::core::error::Result;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts per request, including the first.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Maximum delay between retries.
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    /// Creates a configuration that retries up to three times with backoff.
    pub fn new() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::new()
        }
    }

    /// Sets the maximum number of attempts.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self
    }

    /// Calculates the delay before a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        Duration::from_millis(capped_delay as u64)
    }

    /// Returns whether another attempt should be made.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Sends a request, retrying transport failures according to `config`.
pub async fn send_with_retry(
    transport: &dyn HttpTransport,
    config: &RetryConfig,
    request: HttpRequest,
) -> Result<HttpResponse> {
    let mut attempt = 0;
    loop {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match transport.send(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() => {
                attempt += 1;
                if !config.should_retry(attempt) {
                    return Err(e);
                }
                tracing::warn!(
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    url = %request.url,
                    error = %e,
                    "Retrying request after transport failure"
                );
            }
            Err(e) => return Err(e),
        }
    }
}
