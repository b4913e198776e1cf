//! Report containers emitted by the analytics stage.
//!
//! Field names here are the wire contract with downstream report
//! consumers; renaming anything is a breaking change. Top-N rankings
//! serialize as JSON objects whose key order is the rank order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::serde_util::{deserialize_counts_from_map, serialize_counts_as_map};
use crate::types::ParsingStats;

/// Traffic-and-errors summary for one log file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_requests: u64,
    pub unique_ips: u64,
    /// Percentage of entries with status >= 400, rounded to 4 decimals.
    pub error_rate: f64,
    /// Mean response size in bytes, rounded to 2 decimals.
    pub avg_response_size: f64,
    #[serde(
        serialize_with = "serialize_counts_as_map",
        deserialize_with = "deserialize_counts_from_map"
    )]
    pub top_endpoints: Vec<(String, u64)>,
    #[serde(
        serialize_with = "serialize_counts_as_map",
        deserialize_with = "deserialize_counts_from_map"
    )]
    pub top_ips: Vec<(String, u64)>,
    /// Every observed status code, code-ordered.
    pub status_code_distribution: BTreeMap<u16, u64>,
    /// All 24 "HH:00" buckets, zero-filled, in the entry's own offset.
    pub hourly_traffic: BTreeMap<String, u64>,
    pub error_count: u64,
}

/// Response-time statistics over the entries that carry one.
///
/// `sample_count == 0` marks the empty state: no Extended-format lines
/// were seen and every value is defined as 0 rather than absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub avg_response_time: f64,
    pub median_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    pub max_response_time: f64,
    pub min_response_time: f64,
    /// Number of entries that carried a response time.
    pub sample_count: u64,
    /// Timed entries above the configured slow-request threshold.
    pub slow_requests: u64,
    /// Entries above the configured large-response threshold.
    pub large_responses: u64,
}

impl PerformanceMetrics {
    /// All-zero metrics for a stream with no timed entries.
    pub fn empty() -> Self {
        Self {
            avg_response_time: 0.0,
            median_response_time: 0.0,
            p95_response_time: 0.0,
            p99_response_time: 0.0,
            max_response_time: 0.0,
            min_response_time: 0.0,
            sample_count: 0,
            slow_requests: 0,
            large_responses: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Per-address error accounting for the high-error listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpErrorStats {
    pub error_count: u64,
    pub total_requests: u64,
    /// Percentage, not a fraction.
    pub error_rate: f64,
}

/// Heuristic suspicious-activity signals. Best-effort indicators for
/// operator triage, not a security guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousActivity {
    #[serde(
        serialize_with = "serialize_counts_as_map",
        deserialize_with = "deserialize_counts_from_map"
    )]
    pub high_volume_ips: Vec<(String, u64)>,
    pub high_error_ips: BTreeMap<String, IpErrorStats>,
    #[serde(
        serialize_with = "serialize_counts_as_map",
        deserialize_with = "deserialize_counts_from_map"
    )]
    pub potential_bots: Vec<(String, u64)>,
}

impl SuspiciousActivity {
    pub fn is_empty(&self) -> bool {
        self.high_volume_ips.is_empty()
            && self.high_error_ips.is_empty()
            && self.potential_bots.is_empty()
    }
}

/// Line accounting for the analyzed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Record lines seen (parsed + failed; blanks and comments excluded).
    pub total_entries: u64,
    pub processed_successfully: u64,
    pub processing_errors: u64,
}

/// Everything one analysis run produces, as handed to report consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub report: AnalysisReport,
    pub parsing_stats: ParsingStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_metrics: Option<PerformanceMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious_activity: Option<SuspiciousActivity>,
    pub file_info: FileInfo,
}
