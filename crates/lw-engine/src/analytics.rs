//! Single-pass analytics aggregation.
//!
//! The [`Aggregator`] consumes entries in file order and keeps only
//! counters, so memory stays flat — with one documented exception: exact
//! median/p95/p99 need the full ordering, so response times are buffered
//! in a plain `Vec<f64>` (8 bytes per timed entry). Under the 100 MB
//! input cap that ceiling is a few MB at worst; swap in a mergeable
//! sketch if true constant memory is ever required.

use chrono::Timelike;
use std::collections::{BTreeMap, HashMap};

use crate::anomaly;
use crate::config::{AnalysisConfig, AnomalyThresholds};
use crate::report::{AnalysisReport, PerformanceMetrics, SuspiciousActivity};
use crate::types::LogEntry;

/// A count plus the observation index of the key's first appearance.
/// The index is the tie-break that keeps top-N output deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RankedCount {
    pub(crate) count: u64,
    pub(crate) first_seen: u64,
}

/// Accumulates every report counter in one forward pass over the entry
/// stream. Feed with [`observe`](Self::observe), then pull the finished
/// products; the entry values themselves are never retained.
pub struct Aggregator {
    slow_request_threshold: f64,
    large_response_threshold: u64,
    bot_indicators: Vec<String>,

    total: u64,
    error_count: u64,
    size_sum: u64,
    pub(crate) ip_counts: HashMap<String, RankedCount>,
    path_counts: HashMap<String, RankedCount>,
    pub(crate) ip_errors: HashMap<String, u64>,
    pub(crate) bot_counts: HashMap<String, RankedCount>,
    status_counts: BTreeMap<u16, u64>,
    hourly: [u64; 24],
    // Buffered for exact percentiles; the one non-O(1) accumulator.
    response_times: Vec<f64>,
    slow_requests: u64,
    large_responses: u64,
}

impl Aggregator {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            slow_request_threshold: config.slow_request_threshold,
            large_response_threshold: config.large_response_threshold,
            bot_indicators: config
                .anomaly
                .bot_indicators
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            total: 0,
            error_count: 0,
            size_sum: 0,
            ip_counts: HashMap::new(),
            path_counts: HashMap::new(),
            ip_errors: HashMap::new(),
            bot_counts: HashMap::new(),
            status_counts: BTreeMap::new(),
            hourly: [0; 24],
            response_times: Vec::new(),
            slow_requests: 0,
            large_responses: 0,
        }
    }

    /// Fold one entry into the counters. Entries must arrive in file
    /// order for the first-seen tie-break to be meaningful.
    pub fn observe(&mut self, entry: &LogEntry) {
        let index = self.total;
        self.total += 1;

        let ip = entry.ip_address.to_string();
        bump(&mut self.ip_counts, &ip, index);
        bump(&mut self.path_counts, &entry.path, index);
        *self.status_counts.entry(entry.status_code).or_default() += 1;

        // Hour in the entry's own offset, matching operator-local intuition.
        self.hourly[entry.timestamp.hour() as usize] += 1;

        self.size_sum += entry.response_size;
        if entry.response_size > self.large_response_threshold {
            self.large_responses += 1;
        }

        if entry.is_error() {
            self.error_count += 1;
            *self.ip_errors.entry(ip.clone()).or_default() += 1;
        }

        if let Some(seconds) = entry.response_time {
            self.response_times.push(seconds);
            if seconds > self.slow_request_threshold {
                self.slow_requests += 1;
            }
        }

        if let Some(agent) = &entry.user_agent {
            let agent = agent.to_lowercase();
            if self.bot_indicators.iter().any(|i| agent.contains(i)) {
                bump(&mut self.bot_counts, &ip, index);
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Build the traffic report. An empty stream yields the all-zero
    /// report (with all 24 hourly buckets), never an error.
    pub fn report(&self, top_n: usize) -> AnalysisReport {
        let error_rate = if self.total > 0 {
            round_to(self.error_count as f64 / self.total as f64 * 100.0, 4)
        } else {
            0.0
        };
        let avg_response_size = if self.total > 0 {
            round_to(self.size_sum as f64 / self.total as f64, 2)
        } else {
            0.0
        };

        let hourly_traffic = (0..24)
            .map(|hour| (format!("{hour:02}:00"), self.hourly[hour]))
            .collect();

        AnalysisReport {
            total_requests: self.total,
            unique_ips: self.ip_counts.len() as u64,
            error_rate,
            avg_response_size,
            top_endpoints: top_counts(&self.path_counts, top_n),
            top_ips: top_counts(&self.ip_counts, top_n),
            status_code_distribution: self.status_counts.clone(),
            hourly_traffic,
            error_count: self.error_count,
        }
    }

    /// Percentiles over the buffered response times, nearest-rank over
    /// the sorted sample. No timed entries yields the marked-empty set.
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        if self.response_times.is_empty() {
            let mut metrics = PerformanceMetrics::empty();
            metrics.large_responses = self.large_responses;
            return metrics;
        }
        let mut sorted = self.response_times.clone();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        PerformanceMetrics {
            avg_response_time: sorted.iter().sum::<f64>() / n as f64,
            median_response_time: median,
            p95_response_time: percentile(&sorted, 95.0),
            p99_response_time: percentile(&sorted, 99.0),
            max_response_time: sorted[n - 1],
            min_response_time: sorted[0],
            sample_count: n as u64,
            slow_requests: self.slow_requests,
            large_responses: self.large_responses,
        }
    }

    /// Anomaly signals from the counters already accumulated here; no
    /// second pass over the file.
    pub fn suspicious_activity(&self, thresholds: &AnomalyThresholds) -> SuspiciousActivity {
        anomaly::detect(self, thresholds)
    }
}

fn bump(counts: &mut HashMap<String, RankedCount>, key: &str, index: u64) {
    match counts.get_mut(key) {
        Some(slot) => slot.count += 1,
        None => {
            counts.insert(
                key.to_string(),
                RankedCount {
                    count: 1,
                    first_seen: index,
                },
            );
        }
    }
}

/// The N highest counts, descending, ties broken by first appearance.
pub(crate) fn top_counts(
    counts: &HashMap<String, RankedCount>,
    n: usize,
) -> Vec<(String, u64)> {
    let mut ranked: Vec<(&String, &RankedCount)> = counts.iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen))
    });
    ranked
        .into_iter()
        .take(n)
        .map(|(key, slot)| (key.clone(), slot.count))
        .collect()
}

/// Nearest-rank percentile: `ceil(p/100 * n)`-th smallest, 1-based.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

// ── Convenience entry points over in-memory entry slices ──────

/// Traffic report for a slice of entries.
pub fn analyze(entries: &[LogEntry], top_n: usize) -> AnalysisReport {
    let mut agg = Aggregator::new(&AnalysisConfig::default());
    for entry in entries {
        agg.observe(entry);
    }
    agg.report(top_n)
}

/// Response-time statistics for a slice of entries.
pub fn performance_metrics(entries: &[LogEntry], config: &AnalysisConfig) -> PerformanceMetrics {
    let mut agg = Aggregator::new(config);
    for entry in entries {
        agg.observe(entry);
    }
    agg.performance_metrics()
}

/// Suspicious-activity signals for a slice of entries.
pub fn suspicious_activity(
    entries: &[LogEntry],
    thresholds: &AnomalyThresholds,
) -> SuspiciousActivity {
    let config = AnalysisConfig {
        anomaly: thresholds.clone(),
        ..AnalysisConfig::default()
    };
    let mut agg = Aggregator::new(&config);
    for entry in entries {
        agg.observe(entry);
    }
    agg.suspicious_activity(thresholds)
}
