//! Mock transport for testing.
//!
//! Replays scripted responses in order and records every request it sees,
//! so tests can drive the scan protocol without a network and then assert
//! on what was sent.

use crate::core::error::{Result, ScanError};
use crate::transport::traits::{HttpRequest, HttpResponse, HttpTransport, Method};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A transport that returns pre-scripted responses.
///
/// # Examples
///
/// ```rust
/// use atlant_scan::transport::{HttpResponse, MockTransport};
///
/// let transport = MockTransport::new()
///     .with_response(HttpResponse::json(200, &serde_json::json!({"access_token": "t"})));
/// assert_eq!(transport.remaining(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Creates a transport with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Queues a transport failure.
    pub fn with_failure(self, error: ScanError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Queues a response (non-consuming version).
    pub fn push_response(&self, response: HttpResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Returns all requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the number of requests sent so far.
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Returns the number of requests sent with the given method.
    pub fn count(&self, method: Method) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    /// Returns the number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(ScanError::transport("mock transport has no scripted response")))
    }
}
