//! Scan client configuration.

use crate::client::poll::PollPolicy;
use crate::client::retry::RetryConfig;

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the scan client and its transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,

    /// Wait applied when a pending response carries no `Retry-After`.
    pub default_retry_after: Duration,

    /// Limits on the poll loop.
    pub poll: PollPolicy,

    /// Retry configuration for transport failures.
    pub retry: RetryConfig,

    /// Extra root CA certificate (PEM) to trust.
    pub ca_certificate: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            default_retry_after: Duration::from_secs(1),
            poll: PollPolicy::unbounded(),
            retry: RetryConfig::no_retry(),
            ca_certificate: None,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the wait used when `Retry-After` is absent.
    pub fn with_default_retry_after(mut self, wait: Duration) -> Self {
        self.default_retry_after = wait;
        self
    }

    /// Sets the poll policy.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Trusts an extra root CA certificate.
    pub fn with_ca_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_certificate = Some(path.into());
        self
    }
}
