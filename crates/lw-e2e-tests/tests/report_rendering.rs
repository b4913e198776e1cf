//! Cross-crate rendering: engine output from a real file through the
//! CLI's text renderer.

mod helpers;

use helpers::*;
use lw_analyze::render::render_text;
use lw_engine::{AnalysisConfig, analyze_file};

#[tokio::test]
async fn e2e_text_report_covers_engine_output() {
    let file = write_log(&[COMMON_OK, COMMON_ERR, EXTENDED, BOT, MALFORMED]);
    let output = analyze_file(file.path(), &AnalysisConfig::default())
        .await
        .unwrap();
    let text = render_text(&output);

    for section in [
        "LOG ANALYSIS REPORT",
        "SUMMARY:",
        "TOP ENDPOINTS:",
        "TOP IP ADDRESSES:",
        "STATUS CODE DISTRIBUTION:",
        "HOURLY TRAFFIC PATTERN:",
        "PERFORMANCE METRICS:",
        "ERRORS:",
    ] {
        assert!(text.contains(section), "missing {section}\n{text}");
    }
    // Engine numbers survive into the rendering verbatim.
    assert_eq!(output.report.total_requests, 4);
    assert!(text.contains("Total Requests: 4"));
    assert!(text.contains("Error Rate: 25.00%"));
    assert!(text.contains("Parsing Errors: 1"));
    assert!(text.contains("/api/users"));
    assert!(text.contains("66.249.66.1"));
}

#[tokio::test]
async fn e2e_empty_file_still_renders_a_summary() {
    let file = write_log(&[]);
    let output = analyze_file(file.path(), &AnalysisConfig::default())
        .await
        .unwrap();
    let text = render_text(&output);
    assert!(text.contains("Total Requests: 0"));
    // Nothing to rank, time, or flag: those sections are absent.
    assert!(!text.contains("TOP ENDPOINTS:"));
    assert!(!text.contains("PERFORMANCE METRICS:"));
    assert!(!text.contains("SUSPICIOUS ACTIVITY:"));
    assert!(!text.contains("ERRORS:"));
}

#[tokio::test]
async fn e2e_disabled_sections_never_render() {
    let file = write_log(&[COMMON_OK, EXTENDED, BOT]);
    let config = AnalysisConfig {
        include_performance_metrics: false,
        include_suspicious_activity: false,
        ..AnalysisConfig::default()
    };
    let output = analyze_file(file.path(), &config).await.unwrap();
    let text = render_text(&output);
    assert!(!text.contains("PERFORMANCE METRICS:"));
    assert!(!text.contains("SUSPICIOUS ACTIVITY:"));
    assert!(text.contains("SUMMARY:"));
}
