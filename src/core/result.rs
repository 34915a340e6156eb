//! The terminal result of a scan.

use crate::core::types::{ScanVerdict, Verdict};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The outcome of a scan that reached a terminal verdict.
///
/// The verdict payload is the one reported by the service, unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Filename reported in the upload, if content was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// The verdict payload.
    #[serde(flatten)]
    pub verdict: ScanVerdict,

    /// Task URL that was polled, if the scan did not complete immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_url: Option<String>,

    /// Number of task polls issued.
    pub polls: u32,

    /// When the submission started.
    pub started_at: DateTime<Utc>,

    /// When the terminal verdict was received.
    pub completed_at: DateTime<Utc>,

    /// Time from submission to verdict.
    #[serde(rename = "duration_ms", with = "duration_serde")]
    pub duration: Duration,
}

impl ScanReport {
    /// Returns the verdict.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict.verdict
    }

    /// Returns `true` if the content is considered safe.
    pub fn is_safe(&self) -> bool {
        self.verdict.verdict.is_safe()
    }

    /// Returns `true` if the scan needed polling.
    pub fn was_deferred(&self) -> bool {
        self.task_url.is_some()
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
