//! OAuth2 client-credentials token exchange.

use crate::auth::credentials::{AccessToken, Credentials};
use crate::client::retry::{send_with_retry, RetryConfig};
use crate::core::error::{Result, ScanError};
use crate::transport::{ArcTransport, HttpRequest, RequestBody};

use serde::Deserialize;

/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/api/token/v1";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges client credentials for a bearer access token.
///
/// A rejected exchange is final: credential errors are not transient, so
/// only transport failures are ever retried (and only if `retry` allows).
#[derive(Debug, Clone)]
pub struct TokenProvider {
    transport: ArcTransport,
    retry: RetryConfig,
}

impl TokenProvider {
    /// Creates a token provider using the given transport.
    pub fn new(transport: ArcTransport) -> Self {
        Self {
            transport,
            retry: RetryConfig::no_retry(),
        }
    }

    /// Sets the retry configuration for transport failures.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Requests an access token.
    pub async fn acquire(&self, credentials: &Credentials) -> Result<AccessToken> {
        let url = credentials.service_address.endpoint(TOKEN_PATH);

        tracing::debug!(
            url = %url,
            client_id = %credentials.client_id,
            scopes = ?credentials.scope_string(),
            "Requesting access token"
        );

        let request = HttpRequest::post(url, RequestBody::Form(credentials.form_fields()));
        let response = send_with_retry(self.transport.as_ref(), &self.retry, request).await?;

        if response.status == 200 {
            let token: TokenResponse = serde_json::from_slice(&response.body)
                .map_err(|e| ScanError::protocol(format!("invalid token response: {}", e)))?;
            if token.access_token.is_empty() {
                return Err(ScanError::protocol("token response has an empty 'access_token'"));
            }
            tracing::debug!(expires_in = ?token.expires_in, "Access token acquired");
            return Ok(AccessToken::new(token.access_token));
        }

        let generic = || format!("token endpoint returned status {}", response.status);
        let err = match serde_json::from_slice::<TokenErrorResponse>(&response.body) {
            Ok(body) => ScanError::auth(
                body.error,
                body.error_description
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(generic),
            ),
            Err(_) => ScanError::auth("unexpected_response", generic()),
        };
        tracing::warn!(status = response.status, error = %err, "Token request rejected");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Scope;
    use crate::transport::{HttpResponse, Method, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn credentials() -> Credentials {
        Credentials::new("auth.example:8081", "client-1", "s3cret").with_scope(Scope::Scan)
    }

    #[tokio::test]
    async fn test_acquire_returns_token() {
        let transport = Arc::new(MockTransport::new().with_response(HttpResponse::json(
            200,
            &json!({"access_token": "tok-abc", "expires_in": 3600}),
        )));
        let provider = TokenProvider::new(transport.clone());

        let token = provider.acquire(&credentials()).await.unwrap();
        assert_eq!(token.expose_secret(), "tok-abc");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "https://auth.example:8081/api/token/v1");
        assert!(requests[0].bearer.is_none());
        match &requests[0].body {
            RequestBody::Form(fields) => {
                assert!(fields.contains(&("audience".to_string(), "f-secure-atlant".to_string())));
                assert!(fields.contains(&("scope".to_string(), "scan".to_string())));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejection_carries_server_fields_verbatim() {
        let transport = Arc::new(MockTransport::new().with_response(HttpResponse::json(
            401,
            &json!({"error": "invalid_client", "error_description": "Client authentication failed"}),
        )));
        let provider = TokenProvider::new(transport.clone());

        let err = provider.acquire(&credentials()).await.unwrap_err();
        match err {
            ScanError::Auth { error, description } => {
                assert_eq!(error, "invalid_client");
                assert_eq!(description, "Client authentication failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_rejection_gets_generic_message() {
        let transport = Arc::new(
            MockTransport::new().with_response(HttpResponse::new(502).with_header("Content-Type", "text/html")),
        );
        let err = TokenProvider::new(transport)
            .acquire(&credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Auth { .. }));
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_rejection_without_description_gets_generic_message() {
        let transport = Arc::new(
            MockTransport::new().with_response(HttpResponse::json(400, &json!({"error": "invalid_scope"}))),
        );
        let err = TokenProvider::new(transport)
            .acquire(&credentials())
            .await
            .unwrap_err();

        match &err {
            ScanError::Auth { error, description } => {
                assert_eq!(error, "invalid_scope");
                assert_eq!(description, "token endpoint returned status 400");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.to_string().ends_with(": "));
    }

    #[tokio::test]
    async fn test_rejection_not_retried() {
        let transport = Arc::new(
            MockTransport::new()
                .with_response(HttpResponse::json(400, &json!({"error": "invalid_scope"})))
                .with_response(HttpResponse::json(200, &json!({"access_token": "late"}))),
        );
        let provider = TokenProvider::new(transport.clone())
            .with_retry(RetryConfig::new().with_max_attempts(5));

        assert!(provider.acquire(&credentials()).await.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_token_is_protocol_error() {
        let transport = Arc::new(
            MockTransport::new().with_response(HttpResponse::json(200, &json!({"access_token": ""}))),
        );
        let err = TokenProvider::new(transport)
            .acquire(&credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Protocol { .. }));
    }
}
