//! Human-readable text rendering of an analysis run.

use std::fmt::Write;

use lw_engine::AnalysisOutput;

const RULE: &str = "============================================================";

/// Render the full text report. Sections with nothing to say (no timed
/// entries, no suspicious activity, no errors) are omitted.
pub fn render_text(output: &AnalysisOutput) -> String {
    let report = &output.report;
    let total = report.total_requests;
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "LOG ANALYSIS REPORT");
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "\nSUMMARY:");
    let _ = writeln!(out, "  Total Requests: {}", format_count(total));
    let _ = writeln!(out, "  Unique IPs: {}", format_count(report.unique_ips));
    let _ = writeln!(out, "  Error Rate: {:.2}%", report.error_rate);
    let _ = writeln!(
        out,
        "  Avg Response Size: {}",
        format_bytes(report.avg_response_size as u64)
    );
    let _ = writeln!(
        out,
        "  Parse Success Rate: {:.1}%",
        output.parsing_stats.success_rate * 100.0
    );

    if !report.top_endpoints.is_empty() {
        let _ = writeln!(out, "\nTOP ENDPOINTS:");
        for (endpoint, count) in &report.top_endpoints {
            let _ = writeln!(
                out,
                "  {endpoint:<40} {count:>6} ({:.1}%)",
                share(*count, total)
            );
        }
    }

    if !report.top_ips.is_empty() {
        let _ = writeln!(out, "\nTOP IP ADDRESSES:");
        for (ip, count) in &report.top_ips {
            let _ = writeln!(out, "  {ip:<15} {count:>6} ({:.1}%)", share(*count, total));
        }
    }

    if !report.status_code_distribution.is_empty() {
        let _ = writeln!(out, "\nSTATUS CODE DISTRIBUTION:");
        for (status, count) in &report.status_code_distribution {
            let _ = writeln!(out, "  {status} {count:>6} ({:.1}%)", share(*count, total));
        }
    }

    if total > 0 {
        let _ = writeln!(out, "\nHOURLY TRAFFIC PATTERN:");
        let buckets: Vec<_> = report.hourly_traffic.iter().collect();
        for row in buckets.chunks(6) {
            let mut line = String::from(" ");
            for (hour, count) in row {
                let _ = write!(line, " {hour}: {count:>4}");
            }
            let _ = writeln!(out, "{line}");
        }
    }

    if let Some(metrics) = &output.performance_metrics {
        if !metrics.is_empty() {
            let _ = writeln!(out, "\nPERFORMANCE METRICS:");
            let _ = writeln!(
                out,
                "  Avg Response Time: {}",
                format_duration(metrics.avg_response_time)
            );
            let _ = writeln!(
                out,
                "  Median Response Time: {}",
                format_duration(metrics.median_response_time)
            );
            let _ = writeln!(
                out,
                "  95th Percentile: {}",
                format_duration(metrics.p95_response_time)
            );
            let _ = writeln!(
                out,
                "  99th Percentile: {}",
                format_duration(metrics.p99_response_time)
            );
            let _ = writeln!(
                out,
                "  Max Response Time: {}",
                format_duration(metrics.max_response_time)
            );
            let _ = writeln!(out, "  Slow Requests: {}", metrics.slow_requests);
            let _ = writeln!(out, "  Large Responses: {}", metrics.large_responses);
        }
    }

    if let Some(suspicious) = &output.suspicious_activity {
        if !suspicious.is_empty() {
            let _ = writeln!(out, "\nSUSPICIOUS ACTIVITY:");
            if !suspicious.high_volume_ips.is_empty() {
                let _ = writeln!(out, "  High Volume IPs:");
                for (ip, count) in suspicious.high_volume_ips.iter().take(5) {
                    let _ = writeln!(out, "    {ip}: {count} requests");
                }
            }
            if !suspicious.high_error_ips.is_empty() {
                let _ = writeln!(out, "  High Error IPs:");
                for (ip, stats) in suspicious.high_error_ips.iter().take(5) {
                    let _ = writeln!(
                        out,
                        "    {ip}: {} of {} failed ({:.1}%)",
                        stats.error_count, stats.total_requests, stats.error_rate
                    );
                }
            }
            if !suspicious.potential_bots.is_empty() {
                let _ = writeln!(out, "  Potential Bots:");
                for (ip, count) in suspicious.potential_bots.iter().take(5) {
                    let _ = writeln!(out, "    {ip}: {count} bot-like requests");
                }
            }
        }
    }

    if report.error_count > 0 || output.parsing_stats.error_count > 0 {
        let _ = writeln!(out, "\nERRORS:");
        let _ = writeln!(out, "  Total Error Responses: {}", report.error_count);
        if output.parsing_stats.error_count > 0 {
            let _ = writeln!(
                out,
                "  Parsing Errors: {}",
                output.parsing_stats.error_count
            );
            for message in &output.parsing_stats.errors {
                let _ = writeln!(out, "    {message}");
            }
        }
    }

    let _ = writeln!(out, "\n{RULE}");
    out
}

fn share(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// "617 B", "1.5 KB", "2.3 MB" — whole numbers only below 1 KB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// "250ms", "1.5s", "2m 30s".
pub fn format_duration(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else {
        let minutes = (seconds / 60.0) as u64;
        format!("{minutes}m {:.0}s", seconds % 60.0)
    }
}

/// Thousands-separated count for the summary lines.
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
