//! Scan submission and the poll loop.
//!
//! A scan moves through `Submitted -> Pending -> Complete`, where `Pending`
//! may repeat. The task URL is taken once from the submission response and
//! reused for every poll. Each wait is a timer `.await`, so the task yields
//! while the server works; no poll is sent before the previous response and
//! its wait have both completed.

use crate::auth::AccessToken;
use crate::client::config::ClientConfig;
use crate::client::retry::send_with_retry;
use crate::core::address::ServiceAddress;
use crate::core::error::{Result, ScanError};
use crate::core::input::ScanSubmission;
use crate::core::result::ScanReport;
use crate::core::types::ScanStatusResponse;
use crate::transport::{ArcTransport, HttpRequest, HttpResponse, RequestBody};

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Path of the scan endpoint.
pub const SCAN_PATH: &str = "/api/scan/v1";

/// Where the scan stands between requests.
#[derive(Debug)]
enum PollState {
    /// Waiting on a task; poll `task_url` after `wait`.
    Pending { task_url: String, wait: Duration },
    /// A terminal verdict arrived.
    Complete(ScanStatusResponse),
}

/// Terminal response plus bookkeeping from the poll loop.
#[derive(Debug)]
struct Completion {
    response: ScanStatusResponse,
    task_url: Option<String>,
    polls: u32,
}

/// Client for the scan and task-poll endpoints.
///
/// # Example
///
/// ```rust,ignore
/// use atlant_scan::auth::AccessToken;
/// use atlant_scan::client::{ClientConfig, ScanClient};
/// use atlant_scan::core::ScanSubmission;
///
/// let client = ScanClient::connect("scan.example:443", ClientConfig::default())?;
/// let response = client
///     .submit_and_await(&token, &ScanSubmission::from_path("sample.exe"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ScanClient {
    transport: ArcTransport,
    address: ServiceAddress,
    config: ClientConfig,
}

impl ScanClient {
    /// Creates a client that sends requests through `transport`.
    pub fn new(transport: ArcTransport, address: impl Into<ServiceAddress>, config: ClientConfig) -> Self {
        Self {
            transport,
            address: address.into(),
            config,
        }
    }

    /// Creates a client with an HTTP transport built from `config`.
    #[cfg(feature = "http")]
    pub fn connect(address: impl Into<ServiceAddress>, config: ClientConfig) -> Result<Self> {
        let transport = crate::transport::ReqwestTransport::new(&config)?;
        Ok(Self::new(std::sync::Arc::new(transport), address, config))
    }

    /// Returns the scanning service address.
    pub fn address(&self) -> &ServiceAddress {
        &self.address
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Uploads a submission and returns the immediate response.
    ///
    /// Accepts 200 and 202. A pending response must carry a `Location`
    /// header; without one the response is rejected as malformed.
    pub async fn submit(&self, token: &AccessToken, submission: &ScanSubmission) -> Result<ScanStatusResponse> {
        let file = submission.prepare().await?;

        tracing::info!(
            filename = ?submission.filename(),
            size = file.as_ref().map(|f| f.source.len()),
            "Submitting content for scanning"
        );

        let body = RequestBody::Multipart {
            metadata: submission.metadata.to_json(),
            file,
        };
        let request = HttpRequest::post(self.address.endpoint(SCAN_PATH), body).with_bearer(token);
        let response = send_with_retry(self.transport.as_ref(), &self.config.retry, request).await?;

        if response.status != 200 && response.status != 202 {
            tracing::warn!(status = response.status, "Scan submission rejected");
            return Err(ScanError::Submission {
                status: response.status,
            });
        }

        let parsed = parse_response(&response)?;
        if parsed.is_pending() && parsed.task_url.is_none() {
            return Err(ScanError::protocol(
                "pending scan response has no task URL (missing Location header)",
            ));
        }

        tracing::debug!(
            status = response.status,
            scan_status = parsed.state.as_str(),
            task_url = ?parsed.task_url,
            retry_after = ?parsed.retry_after,
            "Scan submitted"
        );

        Ok(parsed)
    }

    /// Fetches the current state of a pending task.
    pub async fn poll(&self, token: &AccessToken, task_url: &str) -> Result<ScanStatusResponse> {
        let request = HttpRequest::get(self.address.resolve(task_url)).with_bearer(token);
        let response = send_with_retry(self.transport.as_ref(), &self.config.retry, request).await?;

        if response.status != 200 {
            tracing::warn!(status = response.status, task_url = %task_url, "Task poll failed");
            return Err(ScanError::Poll {
                status: response.status,
            });
        }

        parse_response(&response)
    }

    /// Submits content and polls until the scan reaches a terminal verdict.
    pub async fn submit_and_await(
        &self,
        token: &AccessToken,
        submission: &ScanSubmission,
    ) -> Result<ScanStatusResponse> {
        self.submit_and_await_with_cancel(token, submission, &CancellationToken::new())
            .await
    }

    /// Like [`submit_and_await`](Self::submit_and_await), but stops with
    /// [`ScanError::Cancelled`] as soon as `cancel` fires.
    pub async fn submit_and_await_with_cancel(
        &self,
        token: &AccessToken,
        submission: &ScanSubmission,
        cancel: &CancellationToken,
    ) -> Result<ScanStatusResponse> {
        Ok(self.run(token, submission, cancel).await?.response)
    }

    /// Submits content, awaits the verdict and returns a [`ScanReport`].
    pub async fn scan(
        &self,
        token: &AccessToken,
        submission: &ScanSubmission,
        cancel: &CancellationToken,
    ) -> Result<ScanReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let completion = self.run(token, submission, cancel).await?;
        let verdict = completion.response.into_verdict().ok_or_else(|| {
            ScanError::protocol("poll loop ended without a complete response")
        })?;

        Ok(ScanReport {
            filename: submission.filename().map(str::to_string),
            verdict,
            task_url: completion.task_url,
            polls: completion.polls,
            started_at,
            completed_at: Utc::now(),
            duration: clock.elapsed(),
        })
    }

    async fn run(
        &self,
        token: &AccessToken,
        submission: &ScanSubmission,
        cancel: &CancellationToken,
    ) -> Result<Completion> {
        // A deadline too far out to represent never fires.
        let deadline = self
            .config
            .poll
            .deadline
            .and_then(|d| Instant::now().checked_add(d).map(|at| (at, d)));

        let first = self
            .guarded(cancel, deadline, self.submit(token, submission))
            .await?;

        let mut state = match first.task_url.clone() {
            Some(task_url) if first.is_pending() => PollState::Pending {
                wait: self.wait_for(&first),
                task_url,
            },
            _ => PollState::Complete(first),
        };
        let mut task_url_used = None;
        let mut polls = 0u32;

        loop {
            match state {
                PollState::Complete(response) => {
                    tracing::info!(
                        verdict = ?response.verdict().map(|v| v.verdict.as_str()),
                        polls = polls,
                        "Scan complete"
                    );
                    return Ok(Completion {
                        response,
                        task_url: task_url_used,
                        polls,
                    });
                }
                PollState::Pending { task_url, wait } => {
                    if self.config.poll.budget_exhausted(polls) {
                        return Err(ScanError::PollLimitExceeded { polls });
                    }

                    tracing::debug!(
                        task_url = %task_url,
                        wait_secs = wait.as_secs_f64(),
                        "Scan pending, waiting before next poll"
                    );
                    self.guarded(cancel, deadline, async {
                        tokio::time::sleep(wait).await;
                        Ok(())
                    })
                    .await?;

                    polls += 1;
                    let response = self
                        .guarded(cancel, deadline, self.poll(token, &task_url))
                        .await?;
                    tracing::debug!(
                        poll = polls,
                        scan_status = response.state.as_str(),
                        "Task polled"
                    );

                    state = if response.is_complete() {
                        task_url_used = Some(task_url);
                        PollState::Complete(response)
                    } else {
                        PollState::Pending {
                            wait: self.wait_for(&response),
                            task_url,
                        }
                    };
                }
            }
        }
    }

    fn wait_for(&self, response: &ScanStatusResponse) -> Duration {
        response
            .retry_after
            .unwrap_or(self.config.default_retry_after)
    }

    /// Runs `operation` unless `cancel` fires or the deadline passes first.
    async fn guarded<T>(
        &self,
        cancel: &CancellationToken,
        deadline: Option<(Instant, Duration)>,
        operation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let expiry = async {
            match deadline {
                Some((at, _)) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            _ = expiry => Err(ScanError::DeadlineExceeded {
                deadline: deadline.map(|(_, d)| d).unwrap_or_default(),
            }),
            result = operation => result,
        }
    }
}

/// Extracts `Retry-After` and `Location` and parses the body.
fn parse_response(response: &HttpResponse) -> Result<ScanStatusResponse> {
    let retry_after = match response.header("Retry-After") {
        Some(value) => Some(parse_retry_after(value)?),
        None => None,
    };
    let task_url = response.header("Location").map(str::to_string);
    ScanStatusResponse::parse(&response.body, task_url, retry_after)
}

fn parse_retry_after(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ScanError::protocol(format!("invalid Retry-After header '{}'", value)))
}
