//! Response types shared by submissions and polls.
//!
//! The scanning service answers both the initial submission and every
//! task poll with the same JSON shape. Which fields are present depends on
//! the `status` discriminant, so the body is parsed into a loose wire
//! struct first and then validated into [`ScanStatusResponse`].

use crate::core::error::{Result, ScanError};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Final classification of scanned content.
///
/// Unrecognized values are kept verbatim in [`Verdict::Other`] so nothing
/// reported by the service is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Verdict {
    /// No threats found.
    Clean,
    /// Content is known to be safe.
    Whitelisted,
    /// Potentially harmful content.
    Suspicious,
    /// Potentially unwanted application.
    Pua,
    /// Unwanted application.
    Ua,
    /// Harmful content.
    Harmful,
    /// Any other value reported by the service.
    Other(String),
}

impl Verdict {
    /// Returns the wire representation of this verdict.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Clean => "clean",
            Self::Whitelisted => "whitelisted",
            Self::Suspicious => "suspicious",
            Self::Pua => "PUA",
            Self::Ua => "UA",
            Self::Harmful => "harmful",
            Self::Other(value) => value,
        }
    }

    /// Returns `true` if the content is considered safe.
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Clean | Self::Whitelisted)
    }
}

impl From<String> for Verdict {
    fn from(value: String) -> Self {
        match value.as_str() {
            "clean" => Self::Clean,
            "whitelisted" => Self::Whitelisted,
            "suspicious" => Self::Suspicious,
            "PUA" => Self::Pua,
            "UA" => Self::Ua,
            "harmful" => Self::Harmful,
            _ => Self::Other(value),
        }
    }
}

impl From<Verdict> for String {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detection reported for the scanned content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Detection category (e.g. "harmful", "PUA").
    pub category: String,

    /// Infection name.
    pub name: String,

    /// Archive member the detection was found in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
}

/// Warnings raised while scanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanWarnings {
    /// The content was corrupted.
    pub corrupted: bool,
    /// The content was encrypted.
    pub encrypted: bool,
    /// Nested archive depth limit was reached.
    pub max_nested: bool,
    /// Result count limit was reached.
    pub max_results: bool,
    /// Scan time limit was reached.
    pub max_scan_time: bool,
    /// A hash lookup was inconclusive and the content should be submitted.
    pub need_content: bool,
}

impl ScanWarnings {
    /// Returns `true` if any warning is set.
    pub fn any(&self) -> bool {
        self.corrupted
            || self.encrypted
            || self.max_nested
            || self.max_results
            || self.max_scan_time
            || self.need_content
    }

    /// Returns the names of the warnings that are set, in wire order.
    pub fn names(&self) -> Vec<&'static str> {
        [
            (self.corrupted, "corrupted"),
            (self.encrypted, "encrypted"),
            (self.max_nested, "max_nested"),
            (self.max_results, "max_results"),
            (self.max_scan_time, "max_scan_time"),
            (self.need_content, "need_content"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// The payload of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanVerdict {
    /// The verdict (`scan_result` on the wire).
    #[serde(rename = "scan_result")]
    pub verdict: Verdict,

    /// Detections in the order reported.
    #[serde(default)]
    pub detections: Vec<Detection>,

    /// URI categories, when the content was classified by URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri_categories: Option<Vec<String>>,

    /// Scan warnings.
    #[serde(default)]
    pub warnings: ScanWarnings,
}

impl ScanVerdict {
    /// Returns the infection names, in the order reported.
    pub fn infection_names(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.name.as_str())
    }

    /// Returns the detection categories, in the order reported.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.detections.iter().map(|d| d.category.as_str())
    }

    /// Returns `true` if the service asked for the full content.
    pub fn needs_content(&self) -> bool {
        self.warnings.need_content
    }
}

/// Scan state carried by a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    /// The scan finished.
    Complete(ScanVerdict),
    /// The scan was accepted and must be polled.
    Pending,
}

impl ScanState {
    /// Returns the wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete(_) => "complete",
            Self::Pending => "pending",
        }
    }
}

/// A validated response from the scan or poll endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStatusResponse {
    /// Scan state and, when complete, the verdict.
    pub state: ScanState,

    /// Task URL from the `Location` header.
    pub task_url: Option<String>,

    /// Delay requested by the `Retry-After` header.
    pub retry_after: Option<Duration>,
}

/// Response body as it appears on the wire.
#[derive(Debug, Deserialize)]
struct WireScanResponse {
    status: String,
    #[serde(default)]
    scan_result: Option<String>,
    #[serde(default)]
    detections: Option<Vec<Detection>>,
    #[serde(default)]
    uri_categories: Option<Vec<String>>,
    #[serde(default)]
    warnings: Option<ScanWarnings>,
}

impl ScanStatusResponse {
    /// Parses a response body together with the values taken from its headers.
    ///
    /// Fails with a protocol error if the body is not JSON, if `status` is
    /// neither `complete` nor `pending`, or if a `complete` body has no
    /// `scan_result`.
    pub fn parse(body: &[u8], task_url: Option<String>, retry_after: Option<Duration>) -> Result<Self> {
        let wire: WireScanResponse = serde_json::from_slice(body)
            .map_err(|e| ScanError::protocol(format!("invalid scan response: {}", e)))?;

        let state = match wire.status.as_str() {
            "complete" => {
                let verdict = wire.scan_result.ok_or_else(|| {
                    ScanError::protocol("complete response is missing 'scan_result'")
                })?;
                ScanState::Complete(ScanVerdict {
                    verdict: Verdict::from(verdict),
                    detections: wire.detections.unwrap_or_default(),
                    uri_categories: wire.uri_categories,
                    warnings: wire.warnings.unwrap_or_default(),
                })
            }
            "pending" => ScanState::Pending,
            other => {
                return Err(ScanError::protocol(format!(
                    "unexpected scan status '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            state,
            task_url,
            retry_after,
        })
    }

    /// Returns `true` if the scan is complete.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, ScanState::Complete(_))
    }

    /// Returns `true` if the scan is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, ScanState::Pending)
    }

    /// Returns the verdict payload of a completed scan.
    pub fn verdict(&self) -> Option<&ScanVerdict> {
        match &self.state {
            ScanState::Complete(verdict) => Some(verdict),
            ScanState::Pending => None,
        }
    }

    /// Consumes the response and returns the verdict payload, if complete.
    pub fn into_verdict(self) -> Option<ScanVerdict> {
        match self.state {
            ScanState::Complete(verdict) => Some(verdict),
            ScanState::Pending => None,
        }
    }
}
