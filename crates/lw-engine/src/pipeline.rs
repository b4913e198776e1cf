//! File-level entry points: reader → parser → aggregator, one line in
//! flight at a time.

use std::path::Path;

use crate::analytics::Aggregator;
use crate::config::AnalysisConfig;
use crate::error::EngineResult;
use crate::reader::LogReader;
use crate::report::{AnalysisOutput, FileInfo};
use crate::types::{LogEntry, ParsingStats};

/// Parse a whole file into memory.
///
/// For callers that want the entries themselves (re-analysis with
/// different knobs, filtering). [`analyze_file`] is the streaming path
/// and should be preferred when only the report is needed.
pub async fn parse(
    path: impl AsRef<Path>,
    strict: bool,
) -> EngineResult<(Vec<LogEntry>, ParsingStats)> {
    let mut reader = LogReader::open(path, strict).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry);
    }
    Ok((entries, reader.stats()))
}

/// Run the full pipeline over one file and assemble the output object.
///
/// Entries stream straight from the reader into the aggregator, so the
/// file is never resident in memory. Fatal conditions (missing,
/// oversized, strict-mode parse failure) propagate; an empty or
/// all-unparseable file in lenient mode is a valid zero report.
pub async fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> EngineResult<AnalysisOutput> {
    let path = path.as_ref();
    config.validate()?;

    let mut reader =
        LogReader::open_with_limit(path, config.strict_mode, config.max_file_size_bytes).await?;
    let mut agg = Aggregator::new(config);
    while let Some(entry) = reader.next_entry().await? {
        agg.observe(&entry);
    }
    let stats = reader.stats();

    tracing::info!(
        path = %path.display(),
        parsed = stats.parsed_count,
        errors = stats.error_count,
        "log file parsed"
    );

    let report = agg.report(config.top_n);
    let performance_metrics = config
        .include_performance_metrics
        .then(|| agg.performance_metrics());
    let suspicious_activity = config
        .include_suspicious_activity
        .then(|| agg.suspicious_activity(&config.anomaly));

    let file_info = FileInfo {
        total_entries: stats.parsed_count + stats.error_count,
        processed_successfully: stats.parsed_count,
        processing_errors: stats.error_count,
    };

    Ok(AnalysisOutput {
        report,
        parsing_stats: stats,
        performance_metrics,
        suspicious_activity,
        file_info,
    })
}
