//! The scan client.
//!
//! - [`scan_client`] - Submission and the poll loop
//! - [`config`] - Client configuration
//! - [`poll`] - Poll budget and deadline
//! - [`retry`] - Bounded retry of transport failures

pub mod config;
pub mod poll;
pub mod retry;
pub mod scan_client;

pub use config::ClientConfig;
pub use poll::PollPolicy;
pub use retry::RetryConfig;
pub use scan_client::{ScanClient, SCAN_PATH};

use crate::auth::{Credentials, TokenProvider};
use crate::core::address::ServiceAddress;
use crate::core::error::Result;
use crate::core::input::ScanSubmission;
use crate::core::result::ScanReport;
use crate::transport::ArcTransport;

use tokio_util::sync::CancellationToken;

/// Runs the whole flow over `transport`: acquire a token, submit, await
/// the verdict.
///
/// The token is acquired once and used for every request of the scan.
pub async fn scan_with_transport(
    transport: ArcTransport,
    credentials: &Credentials,
    scan_address: impl Into<ServiceAddress>,
    submission: &ScanSubmission,
    config: ClientConfig,
    cancel: &CancellationToken,
) -> Result<ScanReport> {
    let token = TokenProvider::new(transport.clone())
        .with_retry(config.retry.clone())
        .acquire(credentials)
        .await?;

    ScanClient::new(transport, scan_address, config)
        .scan(&token, submission, cancel)
        .await
}

/// Scans a file over HTTP with a fresh token.
#[cfg(feature = "http")]
pub async fn scan_file(
    credentials: &Credentials,
    scan_address: impl Into<ServiceAddress>,
    path: impl Into<std::path::PathBuf>,
    config: ClientConfig,
) -> Result<ScanReport> {
    let transport = crate::transport::ReqwestTransport::new(&config)?;
    scan_with_transport(
        std::sync::Arc::new(transport),
        credentials,
        scan_address,
        &ScanSubmission::from_path(path),
        config,
        &CancellationToken::new(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ScanError;
    use crate::transport::{HttpResponse, Method, MockTransport, RequestBody};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_full_flow_uses_one_token() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response(HttpResponse::json(200, &json!({"access_token": "tok-1", "expires_in": 3600})))
                .with_response(
                    HttpResponse::json(202, &json!({"status": "pending"}))
                        .with_header("Location", "/api/scan/v1/tasks/7")
                        .with_header("Retry-After", "1"),
                )
                .with_response(HttpResponse::json(200, &json!({"status": "complete", "scan_result": "clean"}))),
        );
        let credentials = Credentials::new("auth.example", "client", "secret");

        let report = scan_with_transport(
            transport.clone(),
            &credentials,
            "scan.example",
            &ScanSubmission::from_bytes("a.txt", b"hello".to_vec()),
            ClientConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(report.is_safe());
        assert_eq!(report.polls, 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].url, "https://auth.example/api/token/v1");
        assert!(matches!(requests[0].body, RequestBody::Form(_)));
        assert!(requests[0].bearer.is_none());
        assert!(requests[1..]
            .iter()
            .all(|r| r.bearer.as_ref().unwrap().expose_secret() == "tok-1"));
        assert_eq!(transport.count(Method::Get), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_before_scan() {
        let transport = Arc::new(MockTransport::new().with_response(HttpResponse::json(
            400,
            &json!({"error": "invalid_client", "error_description": "bad secret"}),
        )));
        let credentials = Credentials::new("auth.example", "client", "wrong");

        let err = scan_with_transport(
            transport.clone(),
            &credentials,
            "scan.example",
            &ScanSubmission::from_bytes("a.txt", b"hello".to_vec()),
            ClientConfig::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ScanError::Auth { .. }));
        assert_eq!(transport.request_count(), 1);
    }
}
