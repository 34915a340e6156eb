//! Rendering of scan reports for people and machines.

use crate::core::error::{Result, ScanError};
use crate::core::result::ScanReport;

use std::fmt::Write;

/// Renders a report as plain text.
///
/// ```text
/// result: harmful
/// detections:
///   1. category: harmful name: Trojan.Generic.1
/// warnings: max_nested
/// ```
pub fn render_text(report: &ScanReport) -> String {
    let verdict = &report.verdict;
    let mut out = String::new();

    let _ = writeln!(out, "result: {}", verdict.verdict);

    if !verdict.detections.is_empty() {
        out.push_str("detections:\n");
        for (i, detection) in verdict.detections.iter().enumerate() {
            let _ = write!(
                out,
                "  {}. category: {} name: {}",
                i + 1,
                detection.category,
                detection.name
            );
            if let Some(member) = &detection.member_name {
                let _ = write!(out, " member: {}", member);
            }
            out.push('\n');
        }
    }

    if let Some(categories) = verdict.uri_categories.as_ref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "uri categories: {}", categories.join(", "));
    }

    if verdict.warnings.any() {
        let _ = writeln!(out, "warnings: {}", verdict.warnings.names().join(", "));
    }

    out
}

/// Renders a report as pretty-printed JSON.
pub fn render_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ScanError::protocol(format!("failed to serialize report: {}", e)))
}
