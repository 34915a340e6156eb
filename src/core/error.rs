//! Error types for the scanning client.
//!
//! Every failure of the scan flow is returned as a [`ScanError`]. The
//! client performs no local recovery: an error aborts the scan and is
//! handed back to the caller with enough context to render a message.

use std::time::Duration;
use thiserror::Error;

/// Stable discriminant for [`ScanError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Token exchange rejected.
    Auth,
    /// Local file could not be read.
    Io,
    /// Scan submission returned an unexpected HTTP status.
    Submission,
    /// A poll returned an unexpected HTTP status.
    Poll,
    /// The service answered with a body or headers the client cannot accept.
    Protocol,
    /// The request never produced an HTTP response.
    Transport,
    /// The client was configured with invalid settings.
    Configuration,
    /// The scan was cancelled by the caller.
    Cancelled,
    /// The overall deadline elapsed.
    DeadlineExceeded,
    /// The poll budget was used up.
    PollLimitExceeded,
}

/// The main error type for scan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The token endpoint rejected the client credentials.
    #[error("authentication failed: {error}: {description}")]
    Auth {
        /// Server-reported `error` field.
        error: String,
        /// Server-reported `error_description` field.
        description: String,
    },

    /// The file to scan could not be opened or read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The scan endpoint answered with something other than 200 or 202.
    #[error("scan submission failed (status: {status})")]
    Submission {
        /// HTTP status code.
        status: u16,
    },

    /// A task poll answered with something other than 200.
    #[error("scan poll failed (status: {status})")]
    Poll {
        /// HTTP status code.
        status: u16,
    },

    /// The response could not be interpreted.
    #[error("protocol error: {details}")]
    Protocol {
        /// What was wrong with the response.
        details: String,
    },

    /// The request failed before an HTTP response was received.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
        /// Whether the request timed out.
        timed_out: bool,
    },

    /// Invalid client configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// The scan was cancelled.
    #[error("scan was cancelled")]
    Cancelled,

    /// The overall deadline elapsed before a terminal verdict.
    #[error("scan did not complete within {deadline:?}")]
    DeadlineExceeded {
        /// The configured deadline.
        deadline: Duration,
    },

    /// The task was still pending after the configured number of polls.
    #[error("scan still pending after {polls} polls")]
    PollLimitExceeded {
        /// Number of polls issued.
        polls: u32,
    },
}

impl ScanError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Io { .. } => ErrorKind::Io,
            Self::Submission { .. } => ErrorKind::Submission,
            Self::Poll { .. } => ErrorKind::Poll,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::PollLimitExceeded { .. } => ErrorKind::PollLimitExceeded,
        }
    }

    /// Returns `true` if a single request may be retried after this error.
    ///
    /// Only transport failures qualify; anything the server answered is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns the HTTP status code attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Submission { status } | Self::Poll { status } => Some(*status),
            _ => None,
        }
    }

    /// Creates an `Auth` error.
    pub fn auth(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Auth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates an `Io` error.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a `Protocol` error.
    pub fn protocol(details: impl Into<String>) -> Self {
        Self::Protocol {
            details: details.into(),
        }
    }

    /// Creates a `Transport` error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates a `Transport` error for a request that timed out.
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// A specialized `Result` type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_transient() {
        assert!(ScanError::transport("connection reset").is_transient());
        assert!(ScanError::timed_out("request timed out").is_transient());
        assert!(!ScanError::Poll { status: 503 }.is_transient());
        assert!(!ScanError::auth("invalid_client", "bad secret").is_transient());
    }

    #[test]
    fn test_status_annotation() {
        assert_eq!(ScanError::Submission { status: 413 }.status(), Some(413));
        assert_eq!(ScanError::Poll { status: 500 }.status(), Some(500));
        assert_eq!(ScanError::protocol("bad").status(), None);
    }

    #[test]
    fn test_display_combines_kind_and_detail() {
        let err = ScanError::auth("invalid_client", "Client authentication failed");
        assert_eq!(
            err.to_string(),
            "authentication failed: invalid_client: Client authentication failed"
        );

        let err = ScanError::Poll { status: 500 };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_kind() {
        let io = ScanError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(ScanError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            ScanError::PollLimitExceeded { polls: 3 }.kind(),
            ErrorKind::PollLimitExceeded
        );
    }
}
