//! Argument parsing and config-file overlay.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use lw_engine::{AnalysisConfig, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Analyze web server access logs and generate insights.
#[derive(Debug, Parser)]
#[command(name = "lw-analyze", version, about)]
pub struct Cli {
    /// Path to the log file to analyze
    pub logfile: PathBuf,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of top endpoints/IPs to show (1-100, default 10)
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Fail on the first unparseable line instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Skip response-time performance metrics
    #[arg(long)]
    pub no_performance: bool,

    /// Skip suspicious-activity analysis
    #[arg(long)]
    pub no_suspicious: bool,

    /// TOML configuration file; CLI flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress progress output on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Engine configuration: config file (or defaults) with the CLI
    /// flags layered on top. Flags not given leave the file's values
    /// untouched.
    pub fn engine_config(&self) -> EngineResult<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(&path.to_string_lossy())?,
            None => AnalysisConfig::default(),
        };
        if self.strict {
            config.strict_mode = true;
        }
        if let Some(top) = self.top {
            config.top_n = top;
        }
        if self.no_performance {
            config.include_performance_metrics = false;
        }
        if self.no_suspicious {
            config.include_suspicious_activity = false;
        }
        config.validate()?;
        Ok(config)
    }
}
