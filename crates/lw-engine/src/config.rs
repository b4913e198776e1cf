//! Analysis configuration, loadable from TOML.
//!
//! Every knob has a default, so an empty file (or no file at all) yields a
//! working configuration. `validate()` enforces the documented ranges and
//! should run after any load or programmatic construction.

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::reader::DEFAULT_MAX_FILE_SIZE;

/// Top-level analysis options.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Abort on the first unparseable line instead of skip-and-count.
    #[serde(default)]
    pub strict_mode: bool,
    /// Entries kept in top_endpoints / top_ips rankings (1..=100).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_true")]
    pub include_performance_metrics: bool,
    #[serde(default = "default_true")]
    pub include_suspicious_activity: bool,
    /// Seconds above which a timed request counts as slow (0..=60).
    /// A label for reporting, not a filter.
    #[serde(default = "default_slow_request_threshold")]
    pub slow_request_threshold: f64,
    /// Bytes above which a response counts as large.
    #[serde(default = "default_large_response_threshold")]
    pub large_response_threshold: u64,
    /// Input files larger than this are rejected before parsing.
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    #[serde(default)]
    pub anomaly: AnomalyThresholds,
}

/// Knobs for the suspicious-activity heuristics.
///
/// Defaults mirror long-standing operator practice; treat them as
/// provisional and tune per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyThresholds {
    /// Flag an address once its count exceeds this multiple of the
    /// per-address mean.
    #[serde(default = "default_high_volume_multiplier")]
    pub high_volume_multiplier: f64,
    /// Absolute floor for high-volume flagging; keeps small samples quiet.
    #[serde(default = "default_high_volume_min_requests")]
    pub high_volume_min_requests: u64,
    /// Minimum requests from an address before its error rate is judged.
    #[serde(default = "default_error_rate_min_requests")]
    pub error_rate_min_requests: u64,
    /// Error fraction (0..=1) above which an address is flagged.
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,
    /// Case-insensitive user-agent substrings that mark bot traffic.
    #[serde(default = "default_bot_indicators")]
    pub bot_indicators: Vec<String>,
}

fn default_top_n() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_slow_request_threshold() -> f64 {
    1.0
}

fn default_large_response_threshold() -> u64 {
    1024 * 1024
}

fn default_max_file_size_bytes() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_high_volume_multiplier() -> f64 {
    10.0
}

fn default_high_volume_min_requests() -> u64 {
    100
}

fn default_error_rate_min_requests() -> u64 {
    10
}

fn default_error_rate_threshold() -> f64 {
    0.5
}

fn default_bot_indicators() -> Vec<String> {
    vec![
        "bot".into(),
        "crawler".into(),
        "spider".into(),
        "scraper".into(),
    ]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            top_n: default_top_n(),
            include_performance_metrics: true,
            include_suspicious_activity: true,
            slow_request_threshold: default_slow_request_threshold(),
            large_response_threshold: default_large_response_threshold(),
            max_file_size_bytes: default_max_file_size_bytes(),
            anomaly: AnomalyThresholds::default(),
        }
    }
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            high_volume_multiplier: default_high_volume_multiplier(),
            high_volume_min_requests: default_high_volume_min_requests(),
            error_rate_min_requests: default_error_rate_min_requests(),
            error_rate_threshold: default_error_rate_threshold(),
            bot_indicators: default_bot_indicators(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file path.
    pub fn from_file(path: &str) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every knob against its documented range.
    pub fn validate(&self) -> EngineResult<()> {
        if !(1..=100).contains(&self.top_n) {
            return Err(EngineError::Config(format!(
                "top_n must be in 1..=100, got {}",
                self.top_n
            )));
        }
        if !self.slow_request_threshold.is_finite()
            || !(0.0..=60.0).contains(&self.slow_request_threshold)
        {
            return Err(EngineError::Config(format!(
                "slow_request_threshold must be in 0.0..=60.0 seconds, got {}",
                self.slow_request_threshold
            )));
        }
        if self.max_file_size_bytes == 0 {
            return Err(EngineError::Config(
                "max_file_size_bytes must be positive".into(),
            ));
        }
        if !self.anomaly.high_volume_multiplier.is_finite()
            || self.anomaly.high_volume_multiplier < 0.0
        {
            return Err(EngineError::Config(format!(
                "anomaly.high_volume_multiplier must be non-negative, got {}",
                self.anomaly.high_volume_multiplier
            )));
        }
        if !self.anomaly.error_rate_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.anomaly.error_rate_threshold)
        {
            return Err(EngineError::Config(format!(
                "anomaly.error_rate_threshold must be a fraction in 0.0..=1.0, got {}",
                self.anomaly.error_rate_threshold
            )));
        }
        Ok(())
    }
}
