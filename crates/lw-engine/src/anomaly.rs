//! Heuristic suspicious-activity detection.
//!
//! Works entirely off the counters the aggregator already holds, so a
//! second file pass is never needed. These are triage hints with
//! deliberately simple rules, not a security model; every threshold is
//! an [`AnomalyThresholds`] knob.

use std::collections::BTreeMap;

use crate::analytics::{Aggregator, top_counts};
use crate::config::AnomalyThresholds;
use crate::report::{IpErrorStats, SuspiciousActivity};

/// Bot-count entries surfaced in the report.
const POTENTIAL_BOTS_LIMIT: usize = 10;

/// Derive the suspicious-activity set from an aggregator's counters.
pub fn detect(agg: &Aggregator, thresholds: &AnomalyThresholds) -> SuspiciousActivity {
    SuspiciousActivity {
        high_volume_ips: high_volume_ips(agg, thresholds),
        high_error_ips: high_error_ips(agg, thresholds),
        potential_bots: top_counts(&agg.bot_counts, POTENTIAL_BOTS_LIMIT),
    }
}

/// Addresses well above typical per-address traffic. Both gates must
/// pass: the multiplier of the per-address mean, and the absolute floor
/// that keeps small samples quiet and the behavior testable.
fn high_volume_ips(agg: &Aggregator, thresholds: &AnomalyThresholds) -> Vec<(String, u64)> {
    if agg.ip_counts.is_empty() {
        return Vec::new();
    }
    let mean = agg.total() as f64 / agg.ip_counts.len() as f64;
    let volume_bar = mean * thresholds.high_volume_multiplier;

    let mut flagged: Vec<(String, u64, u64)> = agg
        .ip_counts
        .iter()
        .filter(|(_, slot)| {
            slot.count as f64 > volume_bar && slot.count > thresholds.high_volume_min_requests
        })
        .map(|(ip, slot)| (ip.clone(), slot.count, slot.first_seen))
        .collect();
    flagged.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    flagged.into_iter().map(|(ip, count, _)| (ip, count)).collect()
}

/// Addresses whose error share is suspicious, with a minimum sample so
/// one-off 404s from quiet clients are not flagged.
fn high_error_ips(
    agg: &Aggregator,
    thresholds: &AnomalyThresholds,
) -> BTreeMap<String, IpErrorStats> {
    agg.ip_errors
        .iter()
        .filter_map(|(ip, &error_count)| {
            let total_requests = agg.ip_counts.get(ip)?.count;
            let fraction = error_count as f64 / total_requests as f64;
            if total_requests > thresholds.error_rate_min_requests
                && fraction > thresholds.error_rate_threshold
            {
                Some((
                    ip.clone(),
                    IpErrorStats {
                        error_count,
                        total_requests,
                        error_rate: fraction * 100.0,
                    },
                ))
            } else {
                None
            }
        })
        .collect()
}
