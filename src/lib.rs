//! # Atlant Scan
//!
//! A client for a remote content-scanning service: authenticate with OAuth2
//! client credentials, upload content, and await the verdict.
//!
//! ## Overview
//!
//! A scan is a short protocol exchange:
//!
//! - Exchange client credentials for a bearer token at `/api/token/v1`
//! - Upload the content and its metadata to `/api/scan/v1`
//! - If the service answers `pending`, poll the task URL from the `Location`
//!   header, waiting as long as each `Retry-After` asks, until it answers
//!   `complete`
//!
//! The verdict payload (verdict, detections, URI categories, warnings) is
//! returned exactly as the service reported it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use atlant_scan::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScanError> {
//!     let credentials = Credentials::new("auth.example:8081", "client-id", "client-secret")
//!         .with_scope(Scope::Scan);
//!
//!     let report = scan_file(&credentials, "scan.example:8081", "sample.exe", ClientConfig::default()).await?;
//!     println!("{}", render_text(&report));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes `http` and `cli`
//! - `http` - Network transport backed by `reqwest`
//! - `cli` - The `atlant-scanner` binary, with `clap` and `tracing-subscriber`
//!
//! Library users who do not need the binary can depend on the crate with
//! `default-features = false, features = ["http"]`.
//!
//! ## Architecture
//!
//! - **Core**: Errors, verdict types, submissions and reports
//! - **Transport**: The `HttpTransport` seam, a reqwest transport and a scripted mock
//! - **Auth**: Credentials and the token exchange
//! - **Client**: Submission and the poll loop
//! - **Report**: Text and JSON rendering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod core;
pub mod report;
pub mod transport;

// Re-export commonly used types at the crate root
pub use crate::auth::{AccessToken, Credentials, Scope, TokenProvider};
pub use crate::client::{ClientConfig, PollPolicy, RetryConfig, ScanClient};
pub use crate::core::{
    ScanError, ScanMetadata, ScanReport, ScanSettings, ScanStatusResponse, ScanSubmission,
    ScanVerdict, ServiceAddress, Verdict,
};

#[cfg(feature = "http")]
pub use crate::client::scan_file;

/// Prelude module for convenient imports.
///
/// ```rust
/// use atlant_scan::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AccessToken, Credentials, Scope, TokenProvider};
    pub use crate::client::{ClientConfig, PollPolicy, RetryConfig, ScanClient};
    pub use crate::core::{
        ScanError, ScanMetadata, ScanReport, ScanSettings, ScanStatusResponse, ScanSubmission,
        ScanVerdict, ServiceAddress, Verdict,
    };
    pub use crate::report::{render_json, render_text};

    #[cfg(feature = "http")]
    pub use crate::client::scan_file;
}
