//! Scan metadata sent in the `metadata` part of a submission.
//!
//! Every field is optional and omitted from the JSON when unset, so
//! `ScanMetadata::default()` serializes to `{}`.

use serde::{Deserialize, Serialize};

/// Metadata accompanying a scan submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Settings controlling how the content is scanned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_settings: Option<ScanSettings>,

    /// Information about the content itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_meta: Option<ContentMetadata>,
}

impl ScanMetadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scan settings.
    pub fn with_scan_settings(mut self, settings: ScanSettings) -> Self {
        self.scan_settings = Some(settings);
        self
    }

    /// Sets the content metadata.
    pub fn with_content_meta(mut self, meta: ContentMetadata) -> Self {
        self.content_meta = Some(meta);
        self
    }

    /// Serializes the metadata to its JSON form.
    pub fn to_json(&self) -> String {
        // Only strings, integers, booleans and nested structs: cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Settings controlling how the service scans the content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Extract archives while scanning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_archives: Option<bool>,

    /// Maximum depth of nested archives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nested: Option<u32>,

    /// Maximum scan time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_scan_time: Option<u32>,

    /// Stop at the first detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_on_first: Option<bool>,

    /// Allow metadata to be sent upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_upstream_metadata: Option<bool>,

    /// Enable antispam checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antispam: Option<bool>,

    /// Scan URLs embedded in the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_embedded_urls: Option<bool>,

    /// URI categories that make the content harmful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_uri_categories: Option<Vec<String>>,

    /// Security cloud upstreaming settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_cloud: Option<SecurityCloudSettings>,
}

impl ScanSettings {
    /// Creates settings with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether archives are extracted.
    pub fn with_scan_archives(mut self, enabled: bool) -> Self {
        self.scan_archives = Some(enabled);
        self
    }

    /// Sets the maximum nested archive depth.
    pub fn with_max_nested(mut self, depth: u32) -> Self {
        self.max_nested = Some(depth);
        self
    }

    /// Sets the maximum scan time in seconds.
    pub fn with_max_scan_time(mut self, seconds: u32) -> Self {
        self.max_scan_time = Some(seconds);
        self
    }

    /// Sets whether scanning stops at the first detection.
    pub fn with_stop_on_first(mut self, enabled: bool) -> Self {
        self.stop_on_first = Some(enabled);
        self
    }

    /// Sets whether metadata may be sent upstream.
    pub fn with_allow_upstream_metadata(mut self, enabled: bool) -> Self {
        self.allow_upstream_metadata = Some(enabled);
        self
    }

    /// Returns `true` if no setting has been given.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Security cloud upstreaming settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCloudSettings {
    /// Allow application files to be sent upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_upstream_application_files: Option<bool>,

    /// Allow data files to be sent upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_upstream_data_files: Option<bool>,
}

/// Information about the submitted content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// SHA-1 of the content, hex encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,

    /// URI the content came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Content length in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,

    /// MIME type of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Character set of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,

    /// Source IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    /// Sender address, for mail content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Recipient addresses, for mail content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,
}

impl ContentMetadata {
    /// Creates content metadata identifying the content by its SHA-1.
    pub fn from_sha1(sha1: impl Into<String>) -> Self {
        Self {
            sha1: Some(sha1.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metadata_is_empty_object() {
        assert_eq!(ScanMetadata::default().to_json(), "{}");
    }

    #[test]
    fn test_settings_only_serialize_given_fields() {
        let metadata = ScanMetadata::new().with_scan_settings(
            ScanSettings::new()
                .with_scan_archives(true)
                .with_max_nested(5),
        );
        let value: serde_json::Value = serde_json::from_str(&metadata.to_json()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"scan_settings": {"scan_archives": true, "max_nested": 5}})
        );
    }

    #[test]
    fn test_sha1_content_meta() {
        let metadata = ScanMetadata::new()
            .with_content_meta(ContentMetadata::from_sha1("3395856ce81f2b7382dee72602f798b642f14140"));
        assert!(metadata
            .to_json()
            .contains("\"sha1\":\"3395856ce81f2b7382dee72602f798b642f14140\""));
    }

    #[test]
    fn test_settings_is_empty() {
        assert!(ScanSettings::new().is_empty());
        assert!(!ScanSettings::new().with_stop_on_first(false).is_empty());
    }
}
