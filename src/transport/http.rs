//! HTTP transport backed by `reqwest`.

use crate::client::ClientConfig;
use crate::core::error::{Result, ScanError};
use crate::core::input::{FilePart, UploadSource};
use crate::transport::traits::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::io::Cursor;
use tokio_util::io::ReaderStream;

/// Transport that sends requests with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport using the timeout and CA certificate from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.request_timeout);

        if let Some(path) = &config.ca_certificate {
            let pem = std::fs::read(path).map_err(|e| ScanError::io(path.display().to_string(), e))?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ScanError::configuration(format!(
                    "invalid CA certificate '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| ScanError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn multipart(metadata: String, file: Option<FilePart>) -> Result<Form> {
        let metadata = Part::text(metadata)
            .mime_str("application/json")
            .map_err(|e| ScanError::transport(e.to_string()))?;
        let mut form = Form::new().part("metadata", metadata);

        if let Some(file) = file {
            let len = file.source.len();
            let body = match file.source {
                UploadSource::File { path, .. } => {
                    let handle = UploadSource::open_file(&path).await?;
                    Body::wrap_stream(ReaderStream::new(handle))
                }
                UploadSource::Memory(data) => Body::wrap_stream(ReaderStream::new(Cursor::new(data))),
            };
            let data = Part::stream_with_length(body, len)
                .file_name(file.filename)
                .mime_str("application/octet-stream")
                .map_err(|e| ScanError::transport(e.to_string()))?;
            form = form.part("data", data);
        }

        Ok(form)
    }
}

fn transport_error(error: reqwest::Error) -> ScanError {
    if error.is_timeout() {
        ScanError::timed_out(error.to_string())
    } else {
        ScanError::transport(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart { metadata, file } => {
                builder.multipart(Self::multipart(metadata, file).await?)
            }
        };

        let response = builder.send().await.map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builds_with_defaults() {
        let config = ClientConfig::default().with_request_timeout(Duration::from_secs(5));
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_missing_ca_certificate_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::default().with_ca_certificate(dir.path().join("ca.pem"));
        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
    }

    #[tokio::test]
    async fn test_multipart_without_file() {
        assert!(ReqwestTransport::multipart("{}".to_string(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_multipart_streams_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.bin");
        std::fs::write(&path, vec![0u8; 64 * 1024]).unwrap();

        let file = FilePart {
            filename: "sample.bin".into(),
            source: UploadSource::File { path, len: 64 * 1024 },
        };
        assert!(ReqwestTransport::multipart("{}".to_string(), Some(file)).await.is_ok());
    }

    #[tokio::test]
    async fn test_multipart_file_removed_after_prepare_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = FilePart {
            filename: "gone.bin".into(),
            source: UploadSource::File {
                path: dir.path().join("gone.bin"),
                len: 3,
            },
        };

        let err = ReqwestTransport::multipart("{}".to_string(), Some(file))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Io { .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_multipart_memory_source() {
        let file = FilePart {
            filename: "a.txt".into(),
            source: UploadSource::Memory(std::sync::Arc::from(&b"hello"[..])),
        };
        assert!(ReqwestTransport::multipart("{}".to_string(), Some(file)).await.is_ok());
    }
}
