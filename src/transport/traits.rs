//! The HTTP seam between the scan protocol and the network.
//!
//! The protocol logic builds [`HttpRequest`] values and interprets
//! [`HttpResponse`] values; an [`HttpTransport`] moves them over the wire.
//! Each call to [`HttpTransport::send`] performs exactly one request.

use crate::auth::AccessToken;
use crate::core::error::Result;
use crate::core::input::FilePart;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    Empty,

    /// `application/x-www-form-urlencoded` fields, in order.
    Form(Vec<(String, String)>),

    /// `multipart/form-data` with a JSON `metadata` part and an optional
    /// `data` part.
    Multipart {
        /// JSON for the `metadata` part.
        metadata: String,
        /// File for the `data` part.
        file: Option<FilePart>,
    },
}

/// An outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<AccessToken>,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            bearer: None,
            body: RequestBody::Empty,
        }
    }

    /// Creates a POST request with the given body.
    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            bearer: None,
            body,
        }
    }

    /// Attaches a bearer token.
    pub fn with_bearer(mut self, token: &AccessToken) -> Self {
        self.bearer = Some(token.clone());
        self
    }
}

/// A received response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in received order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and no headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Creates a response with a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string().into_bytes(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the first value of a header, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Sends HTTP requests for the scanning client.
///
/// Implementations must not retry on their own and must report any failure
/// to obtain a response as [`ScanError::Transport`](crate::core::ScanError::Transport).
/// Non-2xx responses are returned as `Ok`; interpreting them is the
/// caller's job.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Sends one request and returns the response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// A shared transport.
pub type ArcTransport = Arc<dyn HttpTransport>;
