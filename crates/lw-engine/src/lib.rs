//! Access-log parsing and analytics engine.
//!
//! Turns raw Apache-style access logs (Common, Combined, and an Extended
//! variant with response times) into validated [`LogEntry`] records and
//! aggregates them into a JSON-serializable [`AnalysisOutput`]: traffic
//! report, parse accounting, response-time percentiles, and heuristic
//! suspicious-activity signals.
//!
//! The pipeline is a single-task pull loop — reader → line parser →
//! aggregator — with one line in flight, so peak memory stays at
//! O(longest line) plus the counters (response times are buffered for
//! exact percentiles; see [`analytics`]).

pub mod analytics;
pub mod anomaly;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod serde_util;
pub mod timestamp;
pub mod types;

// Re-export the public surface
pub use analytics::{Aggregator, analyze, performance_metrics, suspicious_activity};
pub use config::{AnalysisConfig, AnomalyThresholds};
pub use error::{EngineError, EngineResult};
pub use pipeline::{analyze_file, parse};
pub use reader::LogReader;
pub use report::{
    AnalysisOutput, AnalysisReport, FileInfo, IpErrorStats, PerformanceMetrics,
    SuspiciousActivity,
};
pub use types::{FailureReason, HttpMethod, LogEntry, ParseFailure, ParsingStats};
