//! Core types for the scanning client.
//!
//! - [`error`] - The error taxonomy
//! - [`address`] - Service addresses and endpoint URLs
//! - [`types`] - Response types and verdicts
//! - [`metadata`] - Metadata sent with a submission
//! - [`input`] - Scan submissions
//! - [`result`] - The terminal scan report

pub mod address;
pub mod error;
pub mod input;
pub mod metadata;
pub mod result;
pub mod types;

pub use address::ServiceAddress;
pub use error::{ErrorKind, Result, ScanError};
pub use input::{FilePart, ScanSubmission, SubmissionContent, UploadSource};
pub use metadata::{ContentMetadata, ScanMetadata, ScanSettings, SecurityCloudSettings};
pub use result::ScanReport;
pub use types::{
    Detection, ScanState, ScanStatusResponse, ScanVerdict, ScanWarnings, Verdict,
};
